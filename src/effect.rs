#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch `limit` creatures; the result echoes `generation`.
    LoadCatalog { generation: u64, limit: u32 },
    /// Fetch and decode the artwork for entity `id`.
    LoadSprite { id: u32, url: String },
}
