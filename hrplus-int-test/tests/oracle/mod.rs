//! Randomized comparisons against `rstar`.

mod rstar_oracle_test;
