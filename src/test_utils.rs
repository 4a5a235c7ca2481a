//! Deterministic fixture machinery for tests.

mod test_random;

pub use self::test_random::{test_random_instance, TestRandom};
