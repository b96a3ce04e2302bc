use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::models::{ItemRecord, ListOrder, NewItem, UpdatePayload};
use crate::proto::common::Empty;
use crate::proto::items::items_service_server::ItemsService;
use crate::proto::items::{
    CreateItemRequest, CreateItemResponse, DeleteItemRequest, GetImageRequest, GetItemRequest,
    GetItemResponse, ImageChunk, Item, ListItemsRequest, ListItemsResponse, UpdateItemRequest,
    UpdateItemResponse,
};
use crate::services::ItemService;

const IMAGE_CHUNK_SIZE: usize = 64 * 1024; // 64KB chunks

pub struct ItemsServiceImpl {
    items: Arc<ItemService>,
}

impl ItemsServiceImpl {
    pub fn new(items: Arc<ItemService>) -> Self {
        Self { items }
    }

    fn record_to_proto(record: &ItemRecord) -> Item {
        Item {
            item_id: record.item_id.clone(),
            item_count: record.item_count,
            item_price: record.item_price,
            item_brand: record.item_brand.clone(),
            item_name: record.item_name.clone(),
            item_desc: record.item_desc.clone(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[tonic::async_trait]
impl ItemsService for ItemsServiceImpl {
    async fn create_item(
        &self,
        request: Request<CreateItemRequest>,
    ) -> Result<Response<CreateItemResponse>, Status> {
        let req = request.into_inner();

        let item_id = self
            .items
            .create(NewItem {
                item_count: req.item_count,
                item_price: req.item_price,
                item_brand: req.item_brand,
                item_name: req.item_name,
                item_desc: req.item_desc,
                image_base64: req.image_base64,
            })
            .await
            .map_err(|e| e.into_status("create_item"))?;

        Ok(Response::new(CreateItemResponse {
            item_id: item_id.to_string(),
        }))
    }

    async fn get_item(
        &self,
        request: Request<GetItemRequest>,
    ) -> Result<Response<GetItemResponse>, Status> {
        let req = request.into_inner();

        let record = self
            .items
            .get(&req.item_id)
            .await
            .map_err(|e| e.into_status("get_item"))?;

        Ok(Response::new(GetItemResponse {
            item: Some(Self::record_to_proto(&record)),
        }))
    }

    async fn list_items(
        &self,
        request: Request<ListItemsRequest>,
    ) -> Result<Response<ListItemsResponse>, Status> {
        let req = request.into_inner();

        let order = ListOrder::parse(&req.order_by, &req.order)
            .map_err(|e| e.into_status("list_items"))?;
        let records = self
            .items
            .list(order)
            .await
            .map_err(|e| e.into_status("list_items"))?;

        let items: Vec<Item> = records.iter().map(Self::record_to_proto).collect();
        Ok(Response::new(ListItemsResponse { items }))
    }

    async fn update_item(
        &self,
        request: Request<UpdateItemRequest>,
    ) -> Result<Response<UpdateItemResponse>, Status> {
        let req = request.into_inner();

        let payload = UpdatePayload {
            item_count: req.item_count,
            item_price: req.item_price,
            item_brand: req.item_brand,
            item_name: req.item_name,
            item_desc: req.item_desc,
            image_base64: req.image_base64,
        };

        self.items
            .update(&req.item_id, &req.update_field, &payload)
            .await
            .map_err(|e| e.into_status("update_item"))?;

        Ok(Response::new(UpdateItemResponse {
            item_id: req.item_id,
        }))
    }

    async fn delete_item(
        &self,
        request: Request<DeleteItemRequest>,
    ) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();

        self.items
            .delete(&req.item_id)
            .await
            .map_err(|e| e.into_status("delete_item"))?;

        Ok(Response::new(Empty {}))
    }

    type GetImageStream = tokio_stream::wrappers::ReceiverStream<Result<ImageChunk, Status>>;

    async fn get_image(
        &self,
        request: Request<GetImageRequest>,
    ) -> Result<Response<Self::GetImageStream>, Status> {
        let req = request.into_inner();

        let asset = self
            .items
            .image(&req.item_id, req.height, req.width)
            .await
            .map_err(|e| e.into_status("get_image"))?;

        let (tx, rx) = tokio::sync::mpsc::channel(4);
        let content_type = asset.kind.mime_type().to_string();
        let data = asset.data;

        tokio::spawn(async move {
            let total_size = data.len() as i64;
            let mut offset = 0i64;
            for chunk in data.chunks(IMAGE_CHUNK_SIZE) {
                let image_chunk = ImageChunk {
                    data: chunk.to_vec(),
                    offset,
                    total_size,
                    content_type: content_type.clone(),
                };
                if tx.send(Ok(image_chunk)).await.is_err() {
                    break;
                }
                offset += chunk.len() as i64;
            }
        });

        Ok(Response::new(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}
