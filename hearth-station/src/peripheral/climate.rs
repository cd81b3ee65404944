use hearth_core::{ClimateState, endpoint};

use crate::error::RequestFailure;

use super::ClimateService;

impl ClimateService {
    /// Asks the unit to run at the given setpoints. Always requests the unit
    /// to be enabled.
    pub async fn update_settings(
        &self,
        temperature: f32,
        humidity: f32,
    ) -> Result<ClimateState, RequestFailure<ClimateState>> {
        let desired = ClimateState {
            enabled: true,
            temperature,
            humidity,
        };
        self.client
            .update(&self.peripheral, endpoint::UPDATE, &desired, ClimateState::default())
            .await
    }
}
