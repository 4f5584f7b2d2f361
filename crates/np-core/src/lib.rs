pub mod config;
pub mod data_url;
pub mod error;
pub mod geometry;
pub mod message;
pub mod model;
pub mod sale;

pub use config::AppConfig;
pub use data_url::DataUrl;
pub use error::{CaptureError, ConfigError, DataUrlError, EncodingError, MessageError, RenderError, UploadError};
pub use geometry::{CoordinateMap, Point, SurfaceSize};
pub use message::{ErrorKind, SurfaceMessage};
pub use model::*;
pub use sale::{Customer, PromissoryRequest, Sale, SaleFilter};
