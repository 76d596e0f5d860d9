pub const LIST_ACTIVITY_LIMIT_DEFAULT: i64 = 50;
pub const LIST_ACTIVITY_LIMIT_MAX: i64 = 200;
