/// Store assigned identifier. Ids are handed out by the store on insert,
/// entities that have not been persisted yet carry `0`.
pub type ID = i64;

pub trait Entity {
    fn id(&self) -> ID;
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
