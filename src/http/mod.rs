/*
 * Responsibility
 * - handler が返すレスポンス型 (WebResponse) と wire への encoder
 */
mod encoder;
pub mod response;

pub use response::{JsonWebResponse, TextWebResponse, WebResponse};
