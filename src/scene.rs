use crate::collection::index_by_name;
use crate::connection::{HttpTransport, HubRequest, Transport};
use crate::error::{PowerViewError, Result};
use crate::hub::{Hub, SCENES_PATH};
use crate::protocol::SceneData;
use crate::room::Room;
use crate::types::SceneId;
use std::collections::BTreeMap;

/// A scene previously configured on the hub
#[derive(Debug)]
pub struct Scene<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    pub id: SceneId,
    pub name: String,
    pub order: i64,

    /// Room the scene belongs to. Only the id is known; `room.name` is `None`.
    pub room: Room<'h, T>,
}

impl<'h, T: Transport> Scene<'h, T> {
    fn from_data(hub: &'h Hub<T>, data: &SceneData) -> Self {
        Self {
            hub,
            id: data.id,
            name: data.name.clone(),
            order: data.order,
            room: Room::reference(hub, data.room_id),
        }
    }

    pub fn hub(&self) -> &'h Hub<T> {
        self.hub
    }

    /// Activate the scene on the hub
    ///
    /// Nothing about the scene itself changes locally.
    pub async fn activate(&self) -> Result<()> {
        let request = HubRequest::get(SCENES_PATH).with_query(format!("sceneid={}", self.id));
        self.hub.request(request).await?;
        tracing::info!("Activated scene {} ({:?})", self.id, self.name);
        Ok(())
    }
}

/// Snapshot of the scenes reported by one `GET /api/scenes?`
#[derive(Debug)]
pub struct Scenes<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    records: Vec<SceneData>,
}

impl<'h, T: Transport> Scenes<'h, T> {
    pub(crate) fn new(hub: &'h Hub<T>, records: Vec<SceneData>) -> Self {
        Self { hub, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Scenes in the order the hub listed them
    pub fn iter(&self) -> impl Iterator<Item = Scene<'h, T>> + '_ {
        let hub = self.hub;
        self.records.iter().map(move |d| Scene::from_data(hub, d))
    }

    /// Scenes keyed by name; a repeated name keeps the last scene listed
    pub fn as_map(&self) -> BTreeMap<String, Scene<'h, T>> {
        index_by_name(self.iter(), |s| s.name.as_str())
    }

    /// Scenes sorted by name
    pub fn by_name(&self) -> Vec<Scene<'h, T>> {
        self.as_map().into_values().collect()
    }

    /// The scene called `name`, if any
    pub fn get(&self, name: &str) -> Option<Scene<'h, T>> {
        self.records
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| Scene::from_data(self.hub, d))
    }

    /// Like [`Scenes::get`], but a missing scene is an error
    pub fn require(&self, name: &str) -> Result<Scene<'h, T>> {
        self.get(name)
            .ok_or_else(|| PowerViewError::nil_entity("scene", name))
    }

    /// Activate the scene called `name`
    pub async fn activate(&self, name: &str) -> Result<()> {
        self.require(name)?.activate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::connection::mock::RecordingTransport;
    use crate::connection::{Method, RawResponse};

    const SCENES: &str = r#"{
        "sceneIds": [11, 42, 7],
        "sceneData": [
            {"id": 11, "name": "TW9ybmluZw==", "roomId": 5, "order": 0, "colorId": 1, "iconId": 0},
            {"id": 42, "name": "RXZlbmluZw==", "roomId": 5, "order": 1, "colorId": 2, "iconId": 0},
            {"id": 7, "name": "QWxsIFVw", "roomId": 9, "order": 2, "colorId": 3, "iconId": 0}
        ]
    }"#;

    fn hub(transport: RecordingTransport) -> Hub<RecordingTransport> {
        Hub::with_transport(HubConfig::new("10.0.0.31"), transport)
    }

    #[tokio::test]
    async fn should_build_scene_with_room_id_only() {
        let hub = hub(RecordingTransport::json(
            r#"{"sceneData":[{"id":1,"name":"TWFzdGVy","roomId":5}]}"#,
        ));

        let scenes = hub.scenes().await.unwrap();
        let all: Vec<_> = scenes.iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Master");
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].room.id, 5);
        assert_eq!(all[0].room.name, None);
    }

    #[tokio::test]
    async fn should_sort_by_name_without_hub_traffic() {
        let hub = hub(RecordingTransport::json(SCENES));
        let scenes = hub.scenes().await.unwrap();

        let names: Vec<String> = scenes.by_name().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["All Up", "Evening", "Morning"]);

        let again: Vec<String> = scenes.by_name().into_iter().map(|s| s.name).collect();
        assert_eq!(names, again);

        let map_names: Vec<String> = scenes.as_map().into_keys().collect();
        assert_eq!(names, map_names);
        assert_eq!(hub.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn should_activate_scene_by_id() {
        let hub = hub(RecordingTransport::with_responses([
            RawResponse::ok(SCENES),
            RawResponse::ok("{}"),
        ]));
        let scenes = hub.scenes().await.unwrap();

        scenes.require("Evening").unwrap().activate().await.unwrap();

        let requests = hub.transport().requests();
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(requests[1].target(), "/api/scenes?sceneid=42");
    }

    #[tokio::test]
    async fn should_return_hub_error_when_activation_rejected() {
        let hub = hub(RecordingTransport::with_responses([
            RawResponse::ok(SCENES),
            RawResponse {
                status: 404,
                reason: "Not Found".to_string(),
                body: Vec::new(),
            },
        ]));
        let scenes = hub.scenes().await.unwrap();
        let scene = scenes.require("Evening").unwrap();

        let res = scene.activate().await;
        assert!(matches!(res, Err(PowerViewError::Hub { .. })));
        assert_eq!(scene.id, 42);
        assert_eq!(scene.name, "Evening");
    }

    #[tokio::test]
    async fn should_fail_with_nil_entity_for_unknown_scene() {
        let hub = hub(RecordingTransport::json(SCENES));
        let scenes = hub.scenes().await.unwrap();

        assert!(scenes.get("Party").is_none());
        let res = scenes.activate("Party").await;
        assert!(matches!(res, Err(PowerViewError::NilEntity { kind: "scene", .. })));
        assert_eq!(hub.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn should_resolve_duplicate_names_to_last_listed() {
        let hub = hub(RecordingTransport::json(
            r#"{"sceneData":[{"id":1,"name":"RGVu","roomId":1},{"id":2,"name":"RGVu","roomId":1}]}"#,
        ));
        let scenes = hub.scenes().await.unwrap();

        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes.as_map().len(), 1);
        assert_eq!(scenes.as_map()["Den"].id, 2);
        assert_eq!(scenes.get("Den").unwrap().id, 2);
    }
}
