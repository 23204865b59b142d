//! JSON message structures exchanged with the hub

use crate::error::Result;
use crate::types::{RoomId, SceneId, ShadeId};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Channel discriminator the hub expects next to `position1` (bottom rail)
pub const POS_KIND_BOTTOM: u8 = 1;

/// Channel discriminator the hub expects next to `position2` (top rail)
pub const POS_KIND_TOP: u8 = 2;

/// Decode a response body into one of the envelope types below
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    tracing::debug!("Decoding: {}", String::from_utf8_lossy(body));
    Ok(serde_json::from_slice(body)?)
}

/// Names travel as standard Base64; a missing or null name is empty.
fn decode_name<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
        return Ok(String::new());
    };
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| D::Error::custom(format!("invalid base64 name {encoded:?}: {e}")))?;
    String::from_utf8(bytes).map_err(|e| D::Error::custom(format!("name is not UTF-8: {e}")))
}

/// Body of `GET /api/scenes?`; the parallel `sceneIds` list is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ScenesResponse {
    #[serde(rename = "sceneData", default)]
    pub scene_data: Vec<SceneData>,
}

/// One scene record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    pub id: SceneId,
    #[serde(default, deserialize_with = "decode_name")]
    pub name: String,
    #[serde(default)]
    pub room_id: RoomId,
    #[serde(default)]
    pub order: i64,
}

/// Body of `GET /api/rooms?`
#[derive(Debug, Clone, Deserialize)]
pub struct RoomsResponse {
    #[serde(rename = "roomData", default)]
    pub room_data: Vec<RoomData>,
}

/// One room record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    pub id: RoomId,
    #[serde(default, deserialize_with = "decode_name")]
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

/// Body of `GET /api/shades?`
#[derive(Debug, Clone, Deserialize)]
pub struct ShadesResponse {
    #[serde(rename = "shadeData", default)]
    pub shade_data: Vec<ShadeData>,
}

/// One shade record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadeData {
    pub id: ShadeId,
    #[serde(default, deserialize_with = "decode_name")]
    pub name: String,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub order: i64,
    #[serde(rename = "type", default)]
    pub shade_type: Option<i64>,
    #[serde(default)]
    pub battery_strength: i64,
    #[serde(default)]
    pub battery_status: i64,
    #[serde(default)]
    pub battery_is_low: bool,
    #[serde(default)]
    pub positions: ShadePositions,
}

/// Raw rail positions; keys other than `position1`/`position2` are ignored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ShadePositions {
    /// Bottom rail
    #[serde(default)]
    pub position1: u16,
    /// Top rail
    #[serde(default)]
    pub position2: u16,
}

/// Body of `PUT /api/shades/<id>`
///
/// Field order is part of the wire format the hub was observed to accept.
#[derive(Debug, Clone, Serialize)]
pub struct ShadeMoveRequest {
    shade: ShadeMove,
}

#[derive(Debug, Clone, Serialize)]
struct ShadeMove {
    id: ShadeId,
    positions: MovePositions,
}

#[derive(Debug, Clone, Serialize)]
struct MovePositions {
    #[serde(rename = "posKind2")]
    pos_kind2: u8,
    position2: u16,
    #[serde(rename = "posKind1")]
    pos_kind1: u8,
    position1: u16,
}

impl ShadeMoveRequest {
    pub fn new(id: ShadeId, bottom: u16, top: u16) -> Self {
        Self {
            shade: ShadeMove {
                id,
                positions: MovePositions {
                    pos_kind2: POS_KIND_TOP,
                    position2: top,
                    pos_kind1: POS_KIND_BOTTOM,
                    position1: bottom,
                },
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Body of `GET /api/userdata/`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataResponse {
    pub user_data: UserData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default, deserialize_with = "decode_name")]
    pub hub_name: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub room_count: u32,
    #[serde(default)]
    pub shade_count: u32,
    #[serde(default)]
    pub scene_count: u32,
    #[serde(default)]
    pub group_count: u32,
}
