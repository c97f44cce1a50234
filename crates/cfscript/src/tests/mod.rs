//! Behaviour suites for the script runtime.
