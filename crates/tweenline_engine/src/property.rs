//! Uniform get/set/compatibility contract over named attributes of a
//! [`Target`].
//!
//! There are 2 kinds of [`Property`]:
//!
//! - [`Property::Indexed`] reads and writes a slot in the target's
//!   [`Properties`] component. The frame clock interpolates these
//!   natively.
//! - [`Property::Callback`] goes through user supplied getter and
//!   setter closures. These are sampled manually every tick.

use std::fmt;
use std::rc::Rc;

use bevy_ecs::component::{Component, Mutable};
use bevy_ecs::world::World;
use bevy_platform::collections::HashMap;

use crate::accessor::Accessor;
use crate::target::Target;
use crate::value::{PropertyName, PropertyValue, Value};

/// Indexed property storage of an animatable entity.
///
/// # Example
/// ```
/// use bevy_ecs::world::World;
/// use tweenline_engine::property::Properties;
///
/// let mut world = World::new();
/// let entity = world
///     .spawn(Properties::new().with("alpha", 1.0_f32))
///     .id();
///
/// let properties = world.get::<Properties>(entity).unwrap();
/// assert_eq!(properties.get::<f32>("alpha"), Some(1.0));
/// ```
#[derive(Component, Debug, Default, Clone)]
pub struct Properties {
    values: HashMap<PropertyName, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: impl Into<PropertyName>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<PropertyName>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    #[inline]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Typed read of a property, `None` on a missing slot or a kind
    /// mismatch.
    pub fn get<T: PropertyValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(|v| T::try_from(*v).ok())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub type GetterFn = dyn Fn(&World, Target) -> Option<Value>;
/// Receives the target, the initial value of the block and the value
/// to apply. Returns `false` if nothing was written.
pub type SetterFn = dyn Fn(&mut World, Target, &Value, Value) -> bool;

/// A property backed by getter and setter closures.
#[derive(Clone)]
pub struct CallbackProperty {
    name: PropertyName,
    getter: Rc<GetterFn>,
    setter: Rc<SetterFn>,
}

impl CallbackProperty {
    #[inline]
    pub fn name(&self) -> &PropertyName {
        &self.name
    }
}

impl PartialEq for CallbackProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && Rc::ptr_eq(&self.getter, &other.getter)
            && Rc::ptr_eq(&self.setter, &other.setter)
    }
}

impl fmt::Debug for CallbackProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackProperty")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Indexed(PropertyName),
    Callback(CallbackProperty),
}

impl Property {
    /// A slot in the [`Properties`] component.
    pub fn indexed(name: impl Into<PropertyName>) -> Self {
        Self::Indexed(name.into())
    }

    pub fn callback(
        name: impl Into<PropertyName>,
        getter: impl Fn(&World, Target) -> Option<Value> + 'static,
        setter: impl Fn(&mut World, Target, &Value, Value) -> bool + 'static,
    ) -> Self {
        Self::Callback(CallbackProperty {
            name: name.into(),
            getter: Rc::new(getter),
            setter: Rc::new(setter),
        })
    }

    /// A field of component `C`, reached through `accessor`.
    ///
    /// Writes of a mismatching [`Value`] kind are ignored.
    pub fn field<C, T>(
        name: impl Into<PropertyName>,
        accessor: Accessor<C, T>,
    ) -> Self
    where
        C: Component<Mutability = Mutable>,
        T: PropertyValue,
    {
        Self::callback(
            name,
            move |world, target| {
                world
                    .get::<C>(target.entity())
                    .map(|source| accessor.get_ref(source).clone().into())
            },
            move |world, target, _, value| {
                let Ok(value) = T::try_from(value) else {
                    return false;
                };
                let Some(mut source) =
                    world.get_mut::<C>(target.entity())
                else {
                    return false;
                };

                *accessor.get_mut(&mut *source) = value;
                true
            },
        )
    }

    pub fn name(&self) -> &PropertyName {
        match self {
            Property::Indexed(name) => name,
            Property::Callback(callback) => callback.name(),
        }
    }

    /// Indexed properties can be interpolated by the frame clock
    /// without a sampling callback.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Property::Indexed(_))
    }

    pub fn get_value(&self, world: &World, target: Target) -> Option<Value> {
        match self {
            Property::Indexed(name) => world
                .get::<Properties>(target.entity())?
                .value(name.as_str())
                .copied(),
            Property::Callback(callback) => {
                (callback.getter)(world, target)
            }
        }
    }

    /// Write `value` into `target`. `initial` is the value the
    /// animated block started from.
    pub fn set_value(
        &self,
        world: &mut World,
        target: Target,
        initial: &Value,
        value: Value,
    ) -> bool {
        match self {
            Property::Indexed(name) => {
                let Some(mut properties) =
                    world.get_mut::<Properties>(target.entity())
                else {
                    return false;
                };

                properties.insert(name.clone(), value);
                true
            }
            Property::Callback(callback) => {
                (callback.setter)(world, target, initial, value)
            }
        }
    }

    /// Whether `target` currently exposes this property.
    pub fn is_compatible_with(&self, world: &World, target: Target) -> bool {
        self.get_value(world, target).is_some()
    }
}

impl From<&'static str> for Property {
    fn from(name: &'static str) -> Self {
        Self::indexed(name)
    }
}

impl From<PropertyName> for Property {
    fn from(name: PropertyName) -> Self {
        Self::Indexed(name)
    }
}
