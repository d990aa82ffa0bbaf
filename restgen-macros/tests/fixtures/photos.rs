use restgen::restclient;

/// Fetches one photo.
///
/// @GET("/photos/{id}")
pub trait GetPhoto {
    /// @PATH("id")
    fn id(self, id: u64) -> Self;

    /// @QUERY("size")
    fn size(self, size: &str) -> Self;

    /// @SYNC("serde_json::Value")
    fn run(self) -> restclient::Result<serde_json::Value>;
}

include!("photos_restgen.rs");
