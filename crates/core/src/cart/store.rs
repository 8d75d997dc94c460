//! Cart Store
//!
//! Client-held cart state that survives restarts through a [`CartStorage`]
//! backend. Every mutation is persisted, announced to observers with the new
//! item count, and answered with a fresh [`PriceSummary`].

use std::{
    fmt, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    cart::Cart,
    items::{ItemSnapshot, LineItem},
    pricing::{PriceSummary, PricingError, price},
    promo_codes::PromoCodes,
};

/// Persists a cart between sessions.
pub trait CartStorage {
    /// Storage failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored cart, or an empty cart if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be read or decoded.
    fn load(&mut self) -> Result<Cart, Self::Error>;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    fn save(&mut self, cart: &Cart) -> Result<(), Self::Error>;
}

/// Receives the item count after every cart mutation.
pub trait CartObserver {
    /// Called with the new sum of quantities.
    fn on_cart_changed(&mut self, item_count: u64);
}

impl<F> CartObserver for F
where
    F: FnMut(u64),
{
    fn on_cart_changed(&mut self, item_count: u64) {
        self(item_count);
    }
}

/// In-memory storage, useful for tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryCartStorage {
    cart: Cart,
}

impl MemoryCartStorage {
    /// Storage pre-populated with `cart`.
    pub fn with_cart(cart: Cart) -> Self {
        Self { cart }
    }

    /// The last saved cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }
}

impl CartStorage for MemoryCartStorage {
    type Error = std::convert::Infallible;

    fn load(&mut self) -> Result<Cart, Self::Error> {
        Ok(self.cart.clone())
    }

    fn save(&mut self, cart: &Cart) -> Result<(), Self::Error> {
        self.cart = cart.clone();

        Ok(())
    }
}

/// Errors from [`JsonFileCartStorage`].
#[derive(Debug, Error)]
pub enum JsonFileCartError {
    /// IO error reading or writing the cart file
    #[error("cart file IO failed: {0}")]
    Io(#[from] io::Error),

    /// The cart file did not contain a valid cart
    #[error("cart file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stores the cart as a JSON array of line items in a single file.
///
/// A missing file is an empty cart.
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    path: PathBuf,
}

impl JsonFileCartStorage {
    /// Storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileCartStorage {
    type Error = JsonFileCartError;

    fn load(&mut self) -> Result<Cart, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Cart::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, cart: &Cart) -> Result<(), Self::Error> {
        let contents = serde_json::to_string_pretty(cart)?;

        fs::write(&self.path, contents)?;

        Ok(())
    }
}

/// Errors that can occur in the cart store.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Storage backend failure
    #[error("cart storage failed: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Pricing failure
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CartStoreError {
    fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(error))
    }
}

/// Errors from [`CartStore::checkout`].
#[derive(Debug, Error)]
pub enum CheckoutError<E> {
    /// There was nothing to check out
    #[error("cart is empty")]
    EmptyCart,

    /// The submission was rejected; the cart is left untouched
    #[error("checkout was rejected: {0}")]
    Rejected(E),
}

/// A submission accepted by [`CartStore::checkout`].
#[derive(Debug)]
#[must_use]
pub struct CheckoutOutcome<T> {
    /// What the submission returned
    pub output: T,

    /// Set when the emptied cart could not be saved. The in-memory cart is
    /// empty regardless; the stored cart keeps the submitted lines until a
    /// later [`CartStore::clear`] succeeds.
    pub clear_error: Option<CartStoreError>,
}

/// Client-held cart backed by a storage implementation.
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    promo_code: Option<String>,
    promo_codes: PromoCodes,
    observers: Vec<Box<dyn CartObserver + Send>>,
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("cart", &self.cart)
            .field("promo_code", &self.promo_code)
            .field("promo_codes", &self.promo_codes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Open a store, loading any previously saved cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Storage`] if the stored cart cannot be loaded.
    pub fn open(mut storage: S, promo_codes: PromoCodes) -> Result<Self, CartStoreError> {
        let cart = storage.load().map_err(CartStoreError::storage)?;

        Ok(Self {
            storage,
            cart,
            promo_code: None,
            promo_codes,
            observers: Vec::new(),
        })
    }

    /// Register an observer notified after every mutation.
    pub fn subscribe(&mut self, observer: impl CartObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The promo code currently entered, as typed.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Enter or clear a promo code and return the updated summary.
    ///
    /// Unknown codes are kept but grant no discount.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Pricing`] if the cart cannot be priced.
    pub fn apply_promo_code(&mut self, code: Option<&str>) -> Result<PriceSummary, CartStoreError> {
        self.promo_code = code.map(str::to_string);

        self.summary()
    }

    /// Price the current cart with the entered promo code.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Pricing`] if the cart cannot be priced.
    pub fn summary(&self) -> Result<PriceSummary, CartStoreError> {
        Ok(price(
            self.cart.items(),
            self.promo_code.as_deref(),
            &self.promo_codes,
        )?)
    }

    /// Add one unit of an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart cannot be priced or saved, in which
    /// case the cart is left as it was.
    pub fn add_item(&mut self, snapshot: ItemSnapshot) -> Result<PriceSummary, CartStoreError> {
        let mut cart = self.cart.clone();
        cart.add_item(snapshot);

        self.commit(cart)
    }

    /// Change the quantity of a line by `delta`, removing it below one.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart cannot be priced or saved, in which
    /// case the cart is left as it was.
    pub fn change_quantity(
        &mut self,
        reference: &str,
        delta: i64,
    ) -> Result<PriceSummary, CartStoreError> {
        let mut cart = self.cart.clone();
        cart.change_quantity(reference, delta);

        self.commit(cart)
    }

    /// Remove the line for `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart cannot be priced or saved, in which
    /// case the cart is left as it was.
    pub fn remove_item(&mut self, reference: &str) -> Result<PriceSummary, CartStoreError> {
        let mut cart = self.cart.clone();
        cart.remove_item(reference);

        self.commit(cart)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart cannot be priced or saved, in which
    /// case the cart is left as it was.
    pub fn clear(&mut self) -> Result<PriceSummary, CartStoreError> {
        self.commit(Cart::new())
    }

    /// Hand the current lines to `submit` and clear the cart once it succeeds.
    ///
    /// A failed submission leaves the cart exactly as it was. Once `submit`
    /// succeeds its output is always returned; a failure to save the emptied
    /// cart is reported in [`CheckoutOutcome::clear_error`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: there are no lines; `submit` is not called.
    /// - [`CheckoutError::Rejected`]: `submit` failed.
    pub fn checkout<T, E, F>(&mut self, submit: F) -> Result<CheckoutOutcome<T>, CheckoutError<E>>
    where
        F: FnOnce(Vec<LineItem>) -> Result<T, E>,
    {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let output = submit(self.cart.items().to_vec()).map_err(CheckoutError::Rejected)?;

        let cleared = Cart::new();
        let clear_error = self
            .storage
            .save(&cleared)
            .map_err(CartStoreError::storage)
            .err();

        self.cart = cleared;
        self.promo_code = None;
        self.notify();

        Ok(CheckoutOutcome {
            output,
            clear_error,
        })
    }

    fn commit(&mut self, cart: Cart) -> Result<PriceSummary, CartStoreError> {
        let summary = price(cart.items(), self.promo_code.as_deref(), &self.promo_codes)?;

        self.storage.save(&cart).map_err(CartStoreError::storage)?;

        self.cart = cart;
        self.notify();

        Ok(summary)
    }

    fn notify(&mut self) {
        let item_count = self.cart.item_count();

        for observer in &mut self.observers {
            observer.on_cart_changed(item_count);
        }
    }
}
