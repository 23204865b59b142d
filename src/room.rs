use crate::collection::index_by_name;
use crate::connection::{HttpTransport, Transport};
use crate::error::{PowerViewError, Result};
use crate::hub::Hub;
use crate::protocol::RoomData;
use crate::scene::{Scene, Scenes};
use crate::shade::{Shade, Shades};
use crate::types::RoomId;
use std::collections::BTreeMap;

/// A room configured on the hub
///
/// Rooms come from two places. Those listed by [`Hub::rooms`] carry their
/// name; those reached through a scene or shade only know their id, and
/// `name` is `None`.
#[derive(Debug)]
pub struct Room<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    pub id: RoomId,
    pub name: Option<String>,
    pub order: Option<i64>,
}

impl<'h, T: Transport> Room<'h, T> {
    fn from_data(hub: &'h Hub<T>, data: &RoomData) -> Self {
        Self {
            hub,
            id: data.id,
            name: Some(data.name.clone()),
            order: Some(data.order),
        }
    }

    /// Room known only by id
    pub(crate) fn reference(hub: &'h Hub<T>, id: RoomId) -> Self {
        Self {
            hub,
            id,
            name: None,
            order: None,
        }
    }

    pub fn hub(&self) -> &'h Hub<T> {
        self.hub
    }

    /// Scenes in this room, sorted by name
    pub fn scenes(&self, scenes: &Scenes<'h, T>) -> Vec<Scene<'h, T>> {
        scenes
            .by_name()
            .into_iter()
            .filter(|s| s.room.id == self.id)
            .collect()
    }

    /// Shades in this room, sorted by name
    pub fn shades(&self, shades: &Shades<'h, T>) -> Vec<Shade<'h, T>> {
        shades
            .by_name()
            .into_iter()
            .filter(|s| s.room_id == Some(self.id))
            .collect()
    }
}

/// Snapshot of the rooms reported by one `GET /api/rooms?`
#[derive(Debug)]
pub struct Rooms<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    records: Vec<RoomData>,
}

impl<'h, T: Transport> Rooms<'h, T> {
    pub(crate) fn new(hub: &'h Hub<T>, records: Vec<RoomData>) -> Self {
        Self { hub, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rooms in the order the hub listed them
    pub fn iter(&self) -> impl Iterator<Item = Room<'h, T>> + '_ {
        let hub = self.hub;
        self.records.iter().map(move |d| Room::from_data(hub, d))
    }

    /// Rooms keyed by name; a repeated name keeps the last room listed
    pub fn as_map(&self) -> BTreeMap<String, Room<'h, T>> {
        index_by_name(self.iter(), |r| r.name.as_deref().unwrap_or_default())
    }

    /// Rooms sorted by name
    pub fn by_name(&self) -> Vec<Room<'h, T>> {
        self.as_map().into_values().collect()
    }

    pub fn get(&self, name: &str) -> Option<Room<'h, T>> {
        self.records
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| Room::from_data(self.hub, d))
    }

    pub fn require(&self, name: &str) -> Result<Room<'h, T>> {
        self.get(name)
            .ok_or_else(|| PowerViewError::nil_entity("room", name))
    }

    /// Fill in the name of a room known only by id
    pub fn by_id(&self, id: RoomId) -> Option<Room<'h, T>> {
        self.records
            .iter()
            .find(|d| d.id == id)
            .map(|d| Room::from_data(self.hub, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::connection::mock::RecordingTransport;
    use crate::connection::RawResponse;

    const ROOMS: &str = r#"{
        "roomIds": [5, 9],
        "roomData": [
            {"id": 5, "name": "TGl2aW5nIFJvb20=", "order": 0, "colorId": 7, "iconId": 0},
            {"id": 9, "name": "QmVkcm9vbQ==", "order": 1, "colorId": 3, "iconId": 0}
        ]
    }"#;

    fn hub(transport: RecordingTransport) -> Hub<RecordingTransport> {
        Hub::with_transport(HubConfig::new("10.0.0.31"), transport)
    }

    #[tokio::test]
    async fn should_list_rooms_with_names() {
        let hub = hub(RecordingTransport::json(ROOMS));
        let rooms = hub.rooms().await.unwrap();

        let names: Vec<Option<String>> = rooms.by_name().into_iter().map(|r| r.name).collect();
        assert_eq!(names, [Some("Bedroom".to_string()), Some("Living Room".to_string())]);
        assert_eq!(rooms.require("Bedroom").unwrap().id, 9);
        assert!(matches!(
            rooms.require("Garage"),
            Err(PowerViewError::NilEntity { kind: "room", .. })
        ));
    }

    #[tokio::test]
    async fn should_keep_empty_name_distinct_from_absent() {
        let hub = hub(RecordingTransport::json(r#"{"roomData":[{"id":3,"name":""}]}"#));
        let rooms = hub.rooms().await.unwrap();

        let room = rooms.by_id(3).unwrap();
        assert_eq!(room.name.as_deref(), Some(""));
        assert_eq!(Room::reference(&hub, 3).name, None);
    }

    #[tokio::test]
    async fn should_group_scenes_and_shades_by_room() {
        let hub = hub(RecordingTransport::with_responses([
            RawResponse::ok(ROOMS),
            RawResponse::ok(
                r#"{"sceneData":[
                    {"id":1,"name":"T3Blbg==","roomId":5},
                    {"id":2,"name":"Q2xvc2U=","roomId":5},
                    {"id":3,"name":"TmlnaHQ=","roomId":9}
                ]}"#,
            ),
            RawResponse::ok(
                r#"{"shadeData":[
                    {"id":20,"name":"V2luZG93","roomId":9},
                    {"id":21,"name":"RG9vcg==","roomId":5}
                ]}"#,
            ),
        ]));
        let rooms = hub.rooms().await.unwrap();
        let scenes = hub.scenes().await.unwrap();
        let shades = hub.shades().await.unwrap();

        let living = rooms.require("Living Room").unwrap();
        let scene_names: Vec<String> = living.scenes(&scenes).into_iter().map(|s| s.name).collect();
        assert_eq!(scene_names, ["Close", "Open"]);

        let bedroom = rooms.require("Bedroom").unwrap();
        let shade_ids: Vec<i64> = bedroom.shades(&shades).into_iter().map(|s| s.id).collect();
        assert_eq!(shade_ids, [20]);
    }
}
