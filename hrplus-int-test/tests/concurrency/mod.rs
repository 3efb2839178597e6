//! Scenarios sharing one tree between threads.
