//! Shared constants for coursesync.

/// Title used when a row's title cell carries no anchor.
pub const DEFAULT_COURSE_TITLE: &str = "Motorcycle Safety Course";

/// Category code stamped on every course unless the registry overrides it.
pub const DEFAULT_COURSE_CODE: &str = "MSF-BRC";

/// Seat capacity stamped on every course unless the registry overrides it.
pub const DEFAULT_SEATS_TOTAL: u32 = 12;

/// Largest seat count a course can carry; stores keep counts in a signed 32-bit column.
pub const MAX_SEAT_COUNT: u32 = i32::MAX.unsigned_abs();

/// Marker the upstream puts in the seats cell when only a wait list is open.
pub const WAIT_LIST_MARKER: &str = "Wait List";

/// Upstream origin, `{subdomain}` is substituted per institution.
pub const DEFAULT_ORIGIN_TEMPLATE: &str = "https://{subdomain}-register.fundfive.com";

/// Placeholder substituted in the origin template.
pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

/// Path of the course listing endpoint under an institution's origin.
pub const LOAD_COURSES_PATH: &str = "/loadcourses";

/// Page size requested from the upstream. Only the first page is fetched.
pub const PAGE_LENGTH: u32 = 100;

/// Number of positional cells in an upstream row.
pub const RAW_ROW_CELLS: usize = 6;

/// Upstream request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Upper bound for a single store call in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

/// Institutions processed at once. 1 keeps the run fully sequential.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Hard ceiling for the worker pool.
pub const MAX_CONCURRENCY: usize = 16;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 5;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;
