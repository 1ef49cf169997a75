/// Path segment standing in for the id of the user behind the current session.
pub const ME: &str = "me";

#[cfg(not(test))]
pub const BCRYPT_COST: u32 = 10;

#[cfg(test)]
pub const BCRYPT_COST: u32 = 4;

pub const MIN_POLL_OPTIONS: usize = 2;

pub const MAX_RECONCILE_ATTEMPTS: usize = 3;
