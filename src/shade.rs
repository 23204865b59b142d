use crate::collection::index_by_name;
use crate::connection::{HttpTransport, HubRequest, Transport};
use crate::error::{PowerViewError, Result};
use crate::hub::{Hub, SHADES_PATH};
use crate::protocol::{ShadeData, ShadeMoveRequest};
use crate::room::Room;
use crate::types::{Position, RoomId, ShadeId};
use std::collections::BTreeMap;

/// An individual motorized shade
#[derive(Debug)]
pub struct Shade<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    pub id: ShadeId,
    pub name: String,
    pub room_id: Option<RoomId>,
    pub group_id: Option<i64>,

    /// Hardware type code reported by the hub
    pub shade_type: Option<i64>,
    pub order: i64,

    pub battery_strength: i64,
    pub battery_status: i64,
    pub battery_is_low: bool,

    /// Bottom rail (`position1`). 65535 is the top, 0 is the bottom.
    pub bottom: Position,

    /// Top rail (`position2`). 0 is the top, 65535 is the bottom.
    pub top: Position,
}

impl<'h, T: Transport> Shade<'h, T> {
    fn from_data(hub: &'h Hub<T>, data: &ShadeData) -> Self {
        Self {
            hub,
            id: data.id,
            name: data.name.clone(),
            room_id: data.room_id,
            group_id: data.group_id,
            shade_type: data.shade_type,
            order: data.order,
            battery_strength: data.battery_strength,
            battery_status: data.battery_status,
            battery_is_low: data.battery_is_low,
            bottom: data.positions.position1,
            top: data.positions.position2,
        }
    }

    pub fn hub(&self) -> &'h Hub<T> {
        self.hub
    }

    /// Room the shade is assigned to, known by id only
    pub fn room(&self) -> Option<Room<'h, T>> {
        self.room_id.map(|id| Room::reference(self.hub, id))
    }

    /// Move both rails of the shade
    ///
    /// On success `bottom` and `top` hold the requested positions; the hub's
    /// reply is not read back. On failure they are left as they were.
    pub async fn move_to(&mut self, bottom: Position, top: Position) -> Result<()> {
        let body = ShadeMoveRequest::new(self.id, bottom, top).to_json()?;
        let request = HubRequest::put_json(format!("{}/{}", SHADES_PATH, self.id), body);
        self.hub.request(request).await?;

        tracing::info!("Moved shade {} ({:?}) to bottom={} top={}", self.id, self.name, bottom, top);
        self.bottom = bottom;
        self.top = top;
        Ok(())
    }
}

/// Snapshot of the shades reported by one `GET /api/shades?`
#[derive(Debug)]
pub struct Shades<'h, T = HttpTransport> {
    hub: &'h Hub<T>,
    records: Vec<ShadeData>,
}

impl<'h, T: Transport> Shades<'h, T> {
    pub(crate) fn new(hub: &'h Hub<T>, records: Vec<ShadeData>) -> Self {
        Self { hub, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shades in the order the hub listed them
    pub fn iter(&self) -> impl Iterator<Item = Shade<'h, T>> + '_ {
        let hub = self.hub;
        self.records.iter().map(move |d| Shade::from_data(hub, d))
    }

    /// Shades keyed by name; a repeated name keeps the last shade listed
    pub fn as_map(&self) -> BTreeMap<String, Shade<'h, T>> {
        index_by_name(self.iter(), |s| s.name.as_str())
    }

    /// Shades sorted by name
    pub fn by_name(&self) -> Vec<Shade<'h, T>> {
        self.as_map().into_values().collect()
    }

    pub fn get(&self, name: &str) -> Option<Shade<'h, T>> {
        self.records
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| Shade::from_data(self.hub, d))
    }

    pub fn require(&self, name: &str) -> Result<Shade<'h, T>> {
        self.get(name)
            .ok_or_else(|| PowerViewError::nil_entity("shade", name))
    }

    pub fn by_id(&self, id: ShadeId) -> Option<Shade<'h, T>> {
        self.records
            .iter()
            .find(|d| d.id == id)
            .map(|d| Shade::from_data(self.hub, d))
    }
}
