#[path = "property/sampling.rs"]
mod sampling;

#[path = "property/patching.rs"]
mod patching;

#[path = "property/snapshot_roundtrip.rs"]
mod snapshot_roundtrip;
