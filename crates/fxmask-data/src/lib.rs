// fxmask-data: Serde structs for host scene snapshots
pub mod model;
