mod rate_limit;
mod region;

pub use rate_limit::RateLimitLayer;
pub use region::UserRegion;
