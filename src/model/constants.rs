// Rating domain shared by the engine and every caller validating input
pub const MIN_RATING: i32 = 100;
pub const MAX_RATING: i32 = 5000;
pub const RATING_BUCKET_COUNT: usize = (MAX_RATING - MIN_RATING + 1) as usize;
