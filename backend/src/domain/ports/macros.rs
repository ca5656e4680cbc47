//! `define_port_error!` declares a port error enum together with one
//! snake_case constructor per variant. Struct variant fields are taken as
//! `impl Into<T>` so adapters can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field: $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum LedgerPortError {
            Offline => "ledger offline",
            Rejected { reason: String } => "ledger rejected entry: {reason}",
            Stale { expected: u32, actual: u32 } => "stale ledger: expected {expected}, found {actual}",
        }
    }

    #[test]
    fn unit_variants_get_snake_case_constructors() {
        assert_eq!(LedgerPortError::offline(), LedgerPortError::Offline);
        assert_eq!(LedgerPortError::offline().to_string(), "ledger offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LedgerPortError::rejected("duplicate");
        assert_eq!(err.to_string(), "ledger rejected entry: duplicate");
    }

    #[test]
    fn variant_docs_are_preserved_alongside_messages() {
        define_port_error! {
            /// Errors from a documented port.
            pub enum DocumentedPortError {
                /// The port timed out.
                TimedOut { after_ms: u64 } => "timed out after {after_ms}ms",
            }
        }

        assert_eq!(
            DocumentedPortError::timed_out(250_u64).to_string(),
            "timed out after 250ms"
        );
    }

    #[test]
    fn numeric_fields_keep_their_types() {
        let err = LedgerPortError::stale(2_u32, 5_u32);
        assert_eq!(err.to_string(), "stale ledger: expected 2, found 5");
    }
}
