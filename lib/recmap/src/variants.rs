/// A closed key domain: a field-less enum that knows all of its variants.
///
/// [`RecSet::from_enum`](crate::RecSet::from_enum) builds the set of every
/// declared variant from [`ALL`](Self::ALL). Rust enums declare exactly their
/// forward values, so there is nothing to filter out, unlike dynamic hosts
/// whose numeric enums grow synthetic reverse-lookup entries.
///
/// Implement by hand, or declare the enum through [`variants!`](crate::variants)
/// to get the impl for free.
pub trait Variants: Sized + 'static {
    /// Every declared variant, in declaration order.
    const ALL: &'static [Self];
}

/// Declares a field-less enum together with its [`Variants`] impl.
///
/// ```
/// recmap::variants! {
///     #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
///     pub enum Weekday { Mon, Tue, Wed, Thu, Fri }
/// }
///
/// let days = recmap::RecSet::<Weekday>::from_enum();
/// assert_eq!(days.len(), 5);
/// ```
#[macro_export]
macro_rules! variants {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$attr])*
        $vis enum $name {
            $($variant),+
        }

        impl $crate::Variants for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
        }
    };
}
