use crate::{Entity, EntityShape, Error, Result, ShapeError, ValidationError};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// Behavioral flags of a registered model, read only after registration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelOptions {
    /// Track a snapshot on load and write only the changed columns on update.
    pub partial_update: bool,
}

impl ModelOptions {
    pub fn partial_update(mut self, value: bool) -> Self {
        self.partial_update = value;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    Validating,
    Registered,
    Rejected,
}

/// A registered model: immutable shape and the options it was registered with.
///
/// Returned by value from the registry, holding it never blocks other registrations.
#[derive(Debug, Clone)]
pub struct Model {
    pub shape: Arc<EntityShape>,
    pub options: ModelOptions,
}

impl Model {
    pub fn partial_update(&self) -> bool {
        self.options.partial_update
    }
}

/// Process wide cache of compiled entity shapes.
///
/// Shapes are compiled outside the lock, the first one published wins. A declaration that
/// fails to compile is remembered and the same error is returned on every later request.
#[derive(Default)]
pub struct ShapeCache {
    shapes: RwLock<HashMap<TypeId, std::result::Result<Arc<EntityShape>, ShapeError>>>,
}

static SHAPES: LazyLock<ShapeCache> = LazyLock::new(ShapeCache::default);

impl ShapeCache {
    pub fn global() -> &'static ShapeCache {
        &SHAPES
    }

    pub fn shape_of<E: Entity>(&self) -> Result<Arc<EntityShape>> {
        let id = TypeId::of::<E>();
        if let Some(shape) = self
            .shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return shape.clone().map_err(Into::into);
        }
        let compiled = EntityShape::of::<E>().map(Arc::new);
        if let Err(e) = &compiled {
            log::debug!("{e}");
        }
        self.shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(compiled)
            .clone()
            .map_err(Into::into)
    }
}

#[derive(Debug, Clone)]
enum Registration {
    Validating,
    Registered(Model),
    Rejected(ShapeError),
}

/// Table of registered models and their flags.
///
/// Registration goes through `Unregistered → Validating → Registered | Rejected`. Rejection is
/// final: registering the type again returns the same [`ShapeError`].
#[derive(Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Registration>>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::default);

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registry used by the serialization engines and the crud helpers.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Register `E` with the options declared on the type.
    pub fn register<E: Entity>(&self) -> Result<Model> {
        self.register_with::<E>(E::attributes().options)
    }

    /// Register `E` with explicit options.
    ///
    /// Registering again with the same options returns the existing model, different options
    /// are a [`ValidationError::ConflictingOptions`].
    pub fn register_with<E: Entity>(&self, options: ModelOptions) -> Result<Model> {
        let id = TypeId::of::<E>();
        {
            let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
            match models.get(&id) {
                Some(Registration::Registered(model)) => {
                    return Self::same_options::<E>(model, options);
                }
                Some(Registration::Rejected(e)) => return Err(e.clone().into()),
                Some(Registration::Validating) => {}
                None => {
                    models.insert(id, Registration::Validating);
                }
            }
        }
        let compiled = ShapeCache::global().shape_of::<E>();
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        match compiled {
            Ok(shape) => {
                if let Some(Registration::Registered(model)) = models.get(&id) {
                    return Self::same_options::<E>(model, options);
                }
                let model = Model { shape, options };
                log::debug!(
                    "Registered `{}` on table `{}` ({:?})",
                    E::NAME,
                    model.shape.table_name(),
                    options
                );
                models.insert(id, Registration::Registered(model.clone()));
                Ok(model)
            }
            Err(e) => {
                let Some(shape_error) = e.downcast_ref::<ShapeError>().cloned() else {
                    models.remove(&id);
                    return Err(e);
                };
                log::debug!("Rejected `{}`: {shape_error}", E::NAME);
                models.insert(id, Registration::Rejected(shape_error));
                Err(e)
            }
        }
    }

    fn same_options<E: Entity>(model: &Model, options: ModelOptions) -> Result<Model> {
        if model.options != options {
            return Err(Error::new(ValidationError::ConflictingOptions { entity: E::NAME }));
        }
        Ok(model.clone())
    }

    /// Registered model of `E`, registering it implicitly when needed.
    pub fn model<E: Entity>(&self) -> Result<Model> {
        if let Some(Registration::Registered(model)) = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
        {
            return Ok(model.clone());
        }
        self.register::<E>()
    }

    /// Registered model of `E`, without registering it.
    pub fn lookup<E: Entity>(&self) -> Option<Model> {
        match self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
        {
            Some(Registration::Registered(model)) => Some(model.clone()),
            _ => None,
        }
    }

    pub fn state<E: Entity>(&self) -> RegistrationState {
        match self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
        {
            None => RegistrationState::Unregistered,
            Some(Registration::Validating) => RegistrationState::Validating,
            Some(Registration::Registered(..)) => RegistrationState::Registered,
            Some(Registration::Rejected(..)) => RegistrationState::Rejected,
        }
    }
}
