//! Macro generating the error enums returned by driven ports.
//!
//! Every variant uses braces, even when it has no fields, and gets a snake
//! case constructor whose arguments accept anything convertible into the
//! field types:
//!
//! ```ignore
//! define_port_error! {
//!     /// Failures raised by the store.
//!     pub enum StoreError {
//!         Connection { message: String } => "connection failed: {message}",
//!     }
//! }
//! let err = StoreError::connection("refused");
//! ```

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Construct a [`" $name "::" $variant "`] error."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum ProbeStoreError {
            Unreachable { message: String } => "store unreachable: {message}",
            Saturated { in_flight: u32 } => "store saturated with {in_flight} requests",
            Rejected { message: String, status: u16 } => "store rejected ({status}): {message}",
            Closed {} => "store closed",
        }
    }

    #[rstest]
    #[case(ProbeStoreError::unreachable("refused"), "store unreachable: refused")]
    #[case(ProbeStoreError::saturated(8_u32), "store saturated with 8 requests")]
    #[case(
        ProbeStoreError::rejected("duplicate key", 23_u16),
        "store rejected (23): duplicate key"
    )]
    #[case(ProbeStoreError::closed(), "store closed")]
    fn constructors_render_their_message(#[case] error: ProbeStoreError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn constructors_convert_borrowed_strings() {
        assert_eq!(
            ProbeStoreError::unreachable("refused"),
            ProbeStoreError::Unreachable {
                message: "refused".to_owned()
            }
        );
    }
}
