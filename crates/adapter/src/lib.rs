mod drivers;
pub mod services;
mod traits;

pub use drivers::gcs::{GcsConfig, GcsImageStore};
pub use drivers::ghost::{GhostClient, GhostConfig};
pub use drivers::http_client;
pub use drivers::mailgun::{MailgunClient, MailgunConfig};
pub use drivers::pages::HttpPageFetcher;
pub use drivers::twilio::{TwilioClient, TwilioConfig};
pub use traits::{
    CmsClient, CmsResponse, EmailClient, EmailMessage, ImageStore, PageFetcher, Receipt,
    SmsClient,
};
