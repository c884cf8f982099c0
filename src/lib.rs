mod clipboard;

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod country;
pub mod dmenu;
pub mod error;
pub mod feed;
pub mod model;
pub mod onboarding;
pub mod poll;
pub mod redirect;
pub mod session;
pub mod storage;

pub use api::{AuthApi, FeedApi, HttpBackend, PlayerApi};
pub use cache::TtlCache;
pub use clipboard::copy_to_clipboard;
pub use error::{ApiError, LoginError};
pub use onboarding::{Notice, Onboarding, OnboardingError, State};
pub use redirect::Route;
pub use session::{AccessToken, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
