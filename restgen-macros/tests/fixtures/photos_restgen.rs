// CODE GENERATED AUTOMATICALLY WITH RESTGEN
// THIS FILE SHOULD NOT BE EDITED BY HAND

/// Request builder implementing [`GetPhoto`] for `GET /photos/{id}`.
#[allow(dead_code)]
pub struct GetPhotoImpl {
    path_substitutions: ::std::collections::BTreeMap<
        ::std::string::String,
        ::std::string::String,
    >,
    query_params: ::restgen::restclient::Values,
}
impl GetPhotoImpl {
    /// Creates an empty [`GetPhotoImpl`].
    pub fn new() -> Self {
        Self {
            path_substitutions: ::std::collections::BTreeMap::new(),
            query_params: ::restgen::restclient::Values::new(),
        }
    }
    fn apply_path_substitutions(&self, template: &str) -> ::std::string::String {
        ::restgen::restclient::expand_path(template, &self.path_substitutions)
    }
    fn build(
        &self,
    ) -> ::restgen::restclient::Result<::restgen::restclient::reqwest::blocking::Request> {
        let client = ::restgen::restclient::client()?;
        let url = ::restgen::restclient::reqwest::Url::parse(
            &::std::format!(
                "{}{}", client.base_url(), self.apply_path_substitutions("/photos/{id}")
            ),
        )?;
        let mut request = ::restgen::restclient::reqwest::blocking::Request::new(
            ::restgen::restclient::reqwest::Method::GET,
            url,
        );
        if !self.query_params.is_empty() {
            request
                .url_mut()
                .set_query(::std::option::Option::Some(&self.query_params.encode()));
        }
        request
            .headers_mut()
            .insert(
                ::restgen::restclient::reqwest::header::ACCEPT,
                ::restgen::restclient::reqwest::header::HeaderValue::from_static(
                    "application/json",
                ),
            );
        ::std::result::Result::Ok(request)
    }
    fn execute(&self) -> ::restgen::restclient::Result<serde_json::Value> {
        let mut request = self.build()?;
        ::restgen::restclient::reencode_query(&mut request);
        let client = ::restgen::restclient::client()?;
        if client.debug() {
            ::restgen::restclient::debug_request(&request);
        }
        let mut response = client.http_client().execute(request)?;
        if client.debug() {
            ::restgen::restclient::debug_response(&response);
        }
        <serde_json::Value as ::restgen::restclient::FromResponse>::from_response(
            &mut response,
        )
    }
}
impl ::std::default::Default for GetPhotoImpl {
    fn default() -> Self {
        Self::new()
    }
}
/// Creates an empty [`GetPhotoImpl`].
#[allow(dead_code)]
pub fn new_get_photo() -> GetPhotoImpl {
    GetPhotoImpl::new()
}
#[allow(unused_variables)]
impl GetPhoto for GetPhotoImpl {
    fn id(mut self, id: u64) -> Self {
        self.path_substitutions
            .insert(
                ::std::string::String::from("id"),
                ::std::string::ToString::to_string(&id),
            );
        self
    }
    fn size(mut self, size: &str) -> Self {
        self.query_params.add("size", ::std::string::ToString::to_string(&size));
        self
    }
    fn run(self) -> restclient::Result<serde_json::Value> {
        self.execute().map_err(::std::convert::From::from)
    }
}
