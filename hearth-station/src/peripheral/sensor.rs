use hearth_core::{SensorState, endpoint};

use crate::error::RequestFailure;

use super::SensorService;

impl SensorService {
    pub async fn toggle_detected(&self) -> Result<SensorState, RequestFailure<SensorState>> {
        self.client
            .command(&self.peripheral, endpoint::DETECTED, SensorState::default())
            .await
    }
}
