pub mod time;

/// Generate a unique id for one node invocation.
pub fn longid() -> String {
    nanoid::nanoid!()
}
