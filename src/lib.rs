//! Rust library for controlling Hunter Douglas PowerView motorized shades
//!
//! This library talks to a PowerView hub over its local HTTP/JSON API. It
//! supports:
//!
//! - Listing scenes, rooms and shades
//! - Looking entities up by name, or listing them sorted by name
//! - Activating scenes
//! - Moving a shade's bottom and top rails
//! - Reading the hub's identity and inventory counts
//!
//! # Quick Start
//!
//! ```no_run
//! use powerview::{Hub, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::new(HubConfig::new("10.0.0.31"));
//!
//!     for room in hub.rooms().await?.by_name() {
//!         println!("Room {}: {}", room.id, room.name.unwrap_or_default());
//!     }
//!
//!     let shades = hub.shades().await?;
//!     let mut shade = shades.require("Kitchen")?;
//!     shade.move_to(65535, 0).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Hub**: owns the configuration and transport; entry point for listings
//! - **Scenes / Rooms / Shades**: immutable snapshots of one listing response
//! - **Scene / Room / Shade**: handles borrowing the hub, carrying commands
//! - **Connection**: one HTTP request per call over a fresh TCP connection
//! - **Protocol**: JSON message structures and the Base64 name encoding

mod collection;
mod config;
mod connection;
mod error;
mod hub;
mod protocol;
mod room;
mod scene;
mod shade;
mod types;

// Public exports
pub use config::{HubConfig, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use connection::{HttpTransport, HubRequest, Method, RawResponse, Transport, JSON_CONTENT_TYPE};
pub use error::{PowerViewError, Result};
pub use hub::Hub;
pub use protocol::{POS_KIND_BOTTOM, POS_KIND_TOP};
pub use room::{Room, Rooms};
pub use scene::{Scene, Scenes};
pub use shade::{Shade, Shades};
pub use types::{HubInfo, Position, RoomId, SceneId, ShadeId};
