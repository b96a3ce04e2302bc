#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}
