//! Typed accessors that map a component to one of its fields.
//!
//! An [`Accessor`] turns any field of a mutable component into a
//! callback [`Property`](crate::property::Property) via
//! [`Property::field`](crate::property::Property::field).

/// A typed accessor to a field of type `T` within a source type `S`.
///
/// This holds both immutable and mutable function pointers, which
/// allows retrieving references to the target field inside a source.
///
/// # Example
/// ```
/// use tweenline_engine::accessor::Accessor;
///
/// struct Sprite { alpha: f32 }
///
/// fn ref_fn(s: &Sprite) -> &f32 { &s.alpha }
/// fn mut_fn(s: &mut Sprite) -> &mut f32 { &mut s.alpha }
///
/// let accessor = Accessor { ref_fn, mut_fn };
/// let mut sprite = Sprite { alpha: 1.0 };
///
/// assert_eq!(*accessor.get_ref(&sprite), 1.0);
/// *accessor.get_mut(&mut sprite) = 0.5;
/// assert_eq!(sprite.alpha, 0.5);
/// ```
#[derive(Debug)]
pub struct Accessor<S: 'static, T: 'static> {
    pub ref_fn: fn(&S) -> &T,
    pub mut_fn: fn(&mut S) -> &mut T,
}

impl<S, T> Accessor<S, T> {
    #[inline]
    pub fn get_ref<'a>(&self, source: &'a S) -> &'a T {
        (self.ref_fn)(source)
    }

    #[inline]
    pub fn get_mut<'a>(&self, source: &'a mut S) -> &'a mut T {
        (self.mut_fn)(source)
    }
}

// Manual impls, fn pointers are always `Copy` regardless of `S` and
// `T`.
impl<S, T> Clone for Accessor<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for Accessor<S, T> {}

/// Creates an [`Accessor`] from a field path.
///
/// ```
/// use tweenline_engine::accessor;
///
/// struct Sprite { size: Size }
/// struct Size { width: f32 }
///
/// let accessor = accessor!(<Sprite>::size.width);
/// let sprite = Sprite { size: Size { width: 3.0 } };
/// assert_eq!(*accessor.get_ref(&sprite), 3.0);
/// ```
#[macro_export]
macro_rules! accessor {
    (<$source:ty>::$($field:tt).+) => {
        $crate::accessor::Accessor::<$source, _> {
            ref_fn: |source| &source.$($field).+,
            mut_fn: |source| &mut source.$($field).+,
        }
    };
}
