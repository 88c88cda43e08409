// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Macros for the status enums, test builders and config setters.

/// `name()` plus `Display` for a fieldless enum, one wire name per variant.
///
/// The names match the enum's serde representation, so log lines and
/// persisted records spell a status the same way.
///
/// ```ignore
/// crate::simple_display! {
///     RecordStatus {
///         Pending => "pending",
///         Success => "success",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $name:literal ),+ $(,)? }) => {
        impl $enum {
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.name())
            }
        }
    };
}

/// Builder for a record type, available to tests and the `test-support`
/// feature only.
///
/// Every field of the target is listed in exactly one section:
/// `into` setters accept `impl Into<T>`, `set` setters take `T` as is and
/// `option` fields hold `Option<T>` with a setter that wraps in `Some`.
/// The builder starts from the listed defaults.
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            into { $( $into_field:ident : $into_ty:ty = $into_default:expr ),* $(,)? }
            set { $( $set_field:ident : $set_ty:ty = $set_default:expr ),* $(,)? }
            option { $( $opt_field:ident : $opt_ty:ty = $opt_default:expr ),* $(,)? }
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            record: $target,
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $(
                pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                    self.record.$into_field = v.into();
                    self
                }
            )*
            $(
                pub fn $set_field(mut self, v: $set_ty) -> Self {
                    self.record.$set_field = v;
                    self
                }
            )*
            $(
                pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                    self.record.$opt_field = Some(v.into());
                    self
                }
            )*

            pub fn build(self) -> $target {
                self.record
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder {
                    record: $target {
                        $( $into_field: $into_default.into(), )*
                        $( $set_field: $set_default, )*
                        $( $opt_field: $opt_default, )*
                    },
                }
            }
        }
    };
}

/// Chained `with`-style setters, expanded inside an `impl` block.
///
/// ```ignore
/// impl RunnerConfig {
///     rp_core::setters! {
///         into { output_base: PathBuf }
///         set { max_concurrent_jobs: usize }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        into { $( $into_field:ident : $into_ty:ty ),* $(,)? }
        set { $( $set_field:ident : $set_ty:ty ),* $(,)? }
    ) => {
        $(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*
        $(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*
    };
}
