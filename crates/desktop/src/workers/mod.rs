pub mod annotate_worker;
pub mod cascade_cache;
