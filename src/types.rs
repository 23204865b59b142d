use crate::protocol::UserData;
use serde::{Deserialize, Serialize};

/// Scene identifier (hub-assigned)
pub type SceneId = i64;

/// Room identifier (hub-assigned)
pub type RoomId = i64;

/// Shade identifier (hub-assigned)
pub type ShadeId = i64;

/// Raw rail position; 0 and 65535 are the two physical extremes
pub type Position = u16;

/// Hub identity and inventory counts as reported by `/api/userdata/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    pub serial_number: String,

    /// Decoded hub name
    pub name: String,

    pub mac_address: String,
    pub room_count: u32,
    pub shade_count: u32,
    pub scene_count: u32,
    pub group_count: u32,
}

impl From<UserData> for HubInfo {
    fn from(data: UserData) -> Self {
        Self {
            serial_number: data.serial_number,
            name: data.hub_name,
            mac_address: data.mac_address,
            room_count: data.room_count,
            shade_count: data.shade_count,
            scene_count: data.scene_count,
            group_count: data.group_count,
        }
    }
}
