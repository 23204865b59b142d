use crate::config::HubConfig;
use crate::connection::{HttpTransport, HubRequest, Transport};
use crate::error::{PowerViewError, Result};
use crate::protocol::{self, RoomsResponse, ScenesResponse, ShadesResponse, UserDataResponse};
use crate::room::Rooms;
use crate::scene::Scenes;
use crate::shade::Shades;
use crate::types::HubInfo;
use std::time::Duration;
use tokio::time::timeout;

pub(crate) const SCENES_PATH: &str = "/api/scenes";
pub(crate) const ROOMS_PATH: &str = "/api/rooms";
pub(crate) const SHADES_PATH: &str = "/api/shades";
pub(crate) const USERDATA_PATH: &str = "/api/userdata/";

/// Handle to a PowerView hub on the local network
///
/// The hub owns its configuration and transport. Scenes, rooms and shades
/// obtained from it borrow the hub and send every command through it.
///
/// # Example
///
/// ```no_run
/// use powerview::{Hub, HubConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let hub = Hub::new(HubConfig::new("10.0.0.31"));
///
///     let scenes = hub.scenes().await?;
///     for scene in scenes.by_name() {
///         println!("Scene {}: {}", scene.id, scene.name);
///     }
///
///     scenes.activate("Evening").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Hub<T = HttpTransport> {
    config: HubConfig,
    transport: T,
}

impl Hub<HttpTransport> {
    /// Hub reached over HTTP at `config.address`
    pub fn new(config: HubConfig) -> Self {
        let transport = HttpTransport::new(&config);
        Self { config, transport }
    }
}

impl<T: Transport> Hub<T> {
    /// Hub that sends its requests through `transport`
    pub fn with_transport(config: HubConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// The hub's network address
    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Deadline applied to each request
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request and return the body of a 200 response
    pub(crate) async fn request(&self, request: HubRequest) -> Result<Vec<u8>> {
        let target = request.target();
        tracing::debug!("Sending: {} {}", request.method.as_str(), target);

        let response = match timeout(self.config.timeout, self.transport.send(&request)).await {
            Ok(response) => response?,
            Err(_) => {
                tracing::warn!(
                    "{} {} timed out after {:?}",
                    request.method.as_str(),
                    target,
                    self.config.timeout
                );
                return Err(PowerViewError::Timeout);
            }
        };

        if !response.is_success() {
            let status = response.status_text();
            tracing::warn!("{} {} failed: {}", request.method.as_str(), target, status);
            return Err(PowerViewError::Hub { status });
        }

        Ok(response.body)
    }

    /// Query the hub for its configured scenes
    pub async fn scenes(&self) -> Result<Scenes<'_, T>> {
        let body = self.request(HubRequest::listing(SCENES_PATH)).await?;
        let response: ScenesResponse = protocol::decode(&body)?;
        Ok(Scenes::new(self, response.scene_data))
    }

    /// Query the hub for its configured rooms
    pub async fn rooms(&self) -> Result<Rooms<'_, T>> {
        let body = self.request(HubRequest::listing(ROOMS_PATH)).await?;
        let response: RoomsResponse = protocol::decode(&body)?;
        Ok(Rooms::new(self, response.room_data))
    }

    /// Query the hub for its shades and their current positions
    pub async fn shades(&self) -> Result<Shades<'_, T>> {
        let body = self.request(HubRequest::listing(SHADES_PATH)).await?;
        let response: ShadesResponse = protocol::decode(&body)?;
        Ok(Shades::new(self, response.shade_data))
    }

    /// Query the hub's identity and inventory counts
    pub async fn info(&self) -> Result<HubInfo> {
        let body = self.request(HubRequest::get(USERDATA_PATH)).await?;
        let response: UserDataResponse = protocol::decode(&body)?;
        Ok(response.user_data.into())
    }
}
