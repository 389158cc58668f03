pub mod deck_io_util;
pub mod deck_merge_util;
pub mod deck_record_util;
