use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path(CODEC)
        .build()
}

fn server_streaming(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path(CODEC)
        .server_streaming()
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Message types are hand-written prost structs under src/proto, so service
    // stubs are generated without protoc.
    let items = Service::builder()
        .name("ItemsService")
        .package("inventory.items")
        .method(unary(
            "create_item",
            "CreateItem",
            "crate::proto::items::CreateItemRequest",
            "crate::proto::items::CreateItemResponse",
        ))
        .method(unary(
            "get_item",
            "GetItem",
            "crate::proto::items::GetItemRequest",
            "crate::proto::items::GetItemResponse",
        ))
        .method(unary(
            "list_items",
            "ListItems",
            "crate::proto::items::ListItemsRequest",
            "crate::proto::items::ListItemsResponse",
        ))
        .method(unary(
            "update_item",
            "UpdateItem",
            "crate::proto::items::UpdateItemRequest",
            "crate::proto::items::UpdateItemResponse",
        ))
        .method(unary(
            "delete_item",
            "DeleteItem",
            "crate::proto::items::DeleteItemRequest",
            "crate::proto::common::Empty",
        ))
        .method(server_streaming(
            "get_image",
            "GetImage",
            "crate::proto::items::GetImageRequest",
            "crate::proto::items::ImageChunk",
        ))
        .build();

    let health = Service::builder()
        .name("Health")
        .package("grpc.health.v1")
        .method(unary(
            "check",
            "Check",
            "crate::proto::health::HealthCheckRequest",
            "crate::proto::health::HealthCheckResponse",
        ))
        .method(server_streaming(
            "watch",
            "Watch",
            "crate::proto::health::HealthCheckRequest",
            "crate::proto::health::HealthCheckResponse",
        ))
        .build();

    Builder::new().compile(&[items, health]);

    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
