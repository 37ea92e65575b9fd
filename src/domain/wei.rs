// Copyright (c) 2025 - Cowboy AI, Inc.
//! Arbitrary precision token amounts
//!
//! Amounts are carried as [`BigUint`] and serialized as decimal strings so
//! that JSON consumers never truncate them to a float.

use num_bigint::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid wei amount: {0}")]
pub struct WeiError(String);

/// Non-negative amount of wei
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(BigUint);

impl Wei {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Wei {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl FromStr for Wei {
    type Err = WeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim())
            .map(Self)
            .map_err(|_| WeiError(s.to_string()))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Wei {
    type Output = Wei;

    fn add(self, rhs: Wei) -> Wei {
        Wei(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Wei> for Wei {
    type Output = Wei;

    fn add(self, rhs: &'a Wei) -> Wei {
        Wei(self.0 + &rhs.0)
    }
}

impl<'a> AddAssign<&'a Wei> for Wei {
    fn add_assign(&mut self, rhs: &'a Wei) {
        self.0 += &rhs.0;
    }
}

impl Sum for Wei {
    fn sum<I: Iterator<Item = Wei>>(iter: I) -> Self {
        iter.fold(Wei::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Wei> for Wei {
    fn sum<I: Iterator<Item = &'a Wei>>(iter: I) -> Self {
        iter.fold(Wei::zero(), |acc, w| acc + w)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeiVisitor;

        impl<'de> Visitor<'de> for WeiVisitor {
            type Value = Wei;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or unsigned integer amount of wei")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Wei, E> {
                Ok(Wei::from(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Wei, E> {
                Wei::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(WeiVisitor)
    }
}
