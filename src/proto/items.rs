#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub item_count: u64,
    #[prost(double, tag = "3")]
    pub item_price: f64,
    #[prost(string, tag = "4")]
    pub item_brand: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub item_name: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub item_desc: ::prost::alloc::string::String,
    /// RFC 3339, UTC
    #[prost(string, tag = "7")]
    pub created_at: ::prost::alloc::string::String,
    /// RFC 3339, UTC
    #[prost(string, tag = "8")]
    pub updated_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateItemRequest {
    #[prost(uint64, tag = "1")]
    pub item_count: u64,
    #[prost(double, tag = "2")]
    pub item_price: f64,
    #[prost(string, tag = "3")]
    pub item_brand: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub item_name: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub item_desc: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub image_base64: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateItemResponse {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemResponse {
    #[prost(message, optional, tag = "1")]
    pub item: ::core::option::Option<Item>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsRequest {
    /// `created_at` or `updated_at`; empty means `updated_at`
    #[prost(string, tag = "1")]
    pub order_by: ::prost::alloc::string::String,
    /// `asc` or `desc`; empty means `desc`
    #[prost(string, tag = "2")]
    pub order: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: ::prost::alloc::vec::Vec<Item>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateItemRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    /// Which single field to write; the payload fields below are only read
    /// for the selected one.
    #[prost(string, tag = "2")]
    pub update_field: ::prost::alloc::string::String,
    #[prost(uint64, optional, tag = "3")]
    pub item_count: ::core::option::Option<u64>,
    #[prost(double, optional, tag = "4")]
    pub item_price: ::core::option::Option<f64>,
    #[prost(string, optional, tag = "5")]
    pub item_brand: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub item_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub item_desc: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub image_base64: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateItemResponse {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteItemRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetImageRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    /// 0..=8192; both zero selects the original
    #[prost(uint32, tag = "2")]
    pub height: u32,
    #[prost(uint32, tag = "3")]
    pub width: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImageChunk {
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub offset: i64,
    #[prost(int64, tag = "3")]
    pub total_size: i64,
    #[prost(string, tag = "4")]
    pub content_type: ::prost::alloc::string::String,
}

include!(concat!(env!("OUT_DIR"), "/inventory.items.ItemsService.rs"));
