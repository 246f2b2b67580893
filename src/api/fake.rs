//! In-memory backend for store tests
//!
//! Behaves like the real API closely enough for the stores: cart endpoints
//! answer with the full list, order creation clears the server cart. Any
//! method can be made to fail, or held until a test releases it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use super::{AdminApi, ClientError, ClientResult, StorefrontApi};
use crate::domain::aggregates::{
    ApplicationDraft, ApplicationStatus, Brand, CartItem, Category, CheckoutReceipt, DashboardMetrics,
    DistributorApplication, NewOrder, Order, OrderStatus, PaymentCapture, PaymentMethod, PaymentStatus, Product,
    ProductDraft, Review, ReviewDraft, TaxonomyDraft,
};
use crate::domain::value_objects::{Money, Quantity};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub products: Vec<Product>,
    pub brands: Vec<Brand>,
    pub categories: Vec<Category>,
    pub carts: HashMap<String, Vec<CartItem>>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
    pub applications: Vec<DistributorApplication>,
    pub metrics: DashboardMetrics,
    pub omit_approval_url: bool,
}

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
    ids: AtomicU64,
}

pub(crate) fn product(id: &str, price: u32, sale: u32, stock: u32) -> Product {
    Product {
        id: id.into(),
        title: format!("Product {}", id),
        description: String::new(),
        category: None,
        brand: None,
        price: Money::from(price),
        sale_price: Some(Money::from(sale)),
        total_stock: stock,
        image: Some(format!("{}.png", id)),
        images: vec![],
        average_review: None,
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let api = Self::default();
        api.state().products = products;
        Arc::new(api)
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> { self.state.lock().unwrap() }

    pub fn fail(&self, method: &'static str) { self.failing.lock().unwrap().insert(method); }
    pub fn heal(&self, method: &'static str) { self.failing.lock().unwrap().remove(method); }

    /// The next call to `method` computes its answer, then waits for the returned notify.
    pub fn hold(&self, method: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(method, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<&'static str> { self.calls.lock().unwrap().clone() }
    pub fn call_count(&self, method: &str) -> usize { self.calls().iter().filter(|c| **c == method).count() }

    pub fn insert_order(&self, order: Order) { self.state().orders.push(order); }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.state().orders.iter().find(|o| o.id == order_id).cloned()
    }

    fn enter(&self, method: &'static str) -> ClientResult<()> {
        self.calls.lock().unwrap().push(method);
        if self.failing.lock().unwrap().contains(method) {
            return Err(ClientError::Internal(format!("{} failed", method)));
        }
        Ok(())
    }

    async fn gate(&self, method: &'static str) {
        let gate = self.gates.lock().unwrap().remove(method);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.ids.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn with_order<T>(&self, order_id: &str, f: impl FnOnce(&mut Order) -> T) -> ClientResult<T> {
        let mut state = self.state();
        let order = state.orders.iter_mut().find(|o| o.id == order_id).ok_or_else(|| ClientError::NotFound("Order not found".into()))?;
        Ok(f(order))
    }

    fn with_application(&self, id: &str, f: impl FnOnce(&mut DistributorApplication)) -> ClientResult<DistributorApplication> {
        let mut state = self.state();
        let app = state.applications.iter_mut().find(|a| a.id == id).ok_or_else(|| ClientError::NotFound("Application not found".into()))?;
        f(app);
        Ok(app.clone())
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.enter("list_products")?;
        let products = self.state().products.clone();
        self.gate("list_products").await;
        Ok(products)
    }

    async fn get_product(&self, product_id: &str) -> ClientResult<Product> {
        self.enter("get_product")?;
        let found = self.state().products.iter().find(|p| p.id == product_id).cloned();
        self.gate("get_product").await;
        found.ok_or_else(|| ClientError::NotFound("Product not found".into()))
    }

    async fn list_brands(&self) -> ClientResult<Vec<Brand>> {
        self.enter("list_brands")?;
        Ok(self.state().brands.clone())
    }

    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.enter("list_categories")?;
        Ok(self.state().categories.clone())
    }

    async fn fetch_cart(&self, user_id: &str) -> ClientResult<Vec<CartItem>> {
        self.enter("fetch_cart")?;
        let items = self.state().carts.get(user_id).cloned().unwrap_or_default();
        self.gate("fetch_cart").await;
        Ok(items)
    }

    async fn add_to_cart(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>> {
        self.enter("add_to_cart")?;
        let items = {
            let mut state = self.state();
            let product = state.products.iter().find(|p| p.id == product_id).cloned()
                .ok_or_else(|| ClientError::NotFound("Product not found".into()))?;
            let cart = state.carts.entry(user_id.to_string()).or_default();
            match cart.iter_mut().find(|i| i.product_id == product_id) {
                Some(existing) => {
                    existing.quantity = Quantity::new(existing.quantity.value() + quantity.value()).unwrap();
                }
                None => cart.push(CartItem {
                    product_id: product.id.clone(),
                    title: product.title.clone(),
                    image: product.image.clone(),
                    images: product.images.clone(),
                    price: product.price,
                    sale_price: product.sale_price,
                    quantity,
                }),
            }
            cart.clone()
        };
        self.gate("add_to_cart").await;
        Ok(items)
    }

    async fn update_cart_quantity(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>> {
        self.enter("update_cart_quantity")?;
        let items = {
            let mut state = self.state();
            let cart = state.carts.entry(user_id.to_string()).or_default();
            let item = cart.iter_mut().find(|i| i.product_id == product_id)
                .ok_or_else(|| ClientError::NotFound("Cart item not present".into()))?;
            item.quantity = quantity;
            cart.clone()
        };
        self.gate("update_cart_quantity").await;
        Ok(items)
    }

    async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> ClientResult<Vec<CartItem>> {
        self.enter("remove_from_cart")?;
        let items = {
            let mut state = self.state();
            let cart = state.carts.entry(user_id.to_string()).or_default();
            cart.retain(|i| i.product_id != product_id);
            cart.clone()
        };
        self.gate("remove_from_cart").await;
        Ok(items)
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<CheckoutReceipt> {
        self.enter("create_order")?;
        let id = self.next_id("O");
        let receipt = {
            let mut state = self.state();
            state.orders.push(Order {
                id: id.clone(),
                user_id: order.user_id.clone(),
                cart_items: order.cart_items.clone(),
                address_info: order.address_info.clone(),
                order_status: order.order_status,
                payment_method: order.payment_method,
                payment_status: order.payment_status,
                total_amount: order.total_amount,
                order_date: order.order_date,
                order_update_date: Some(order.order_update_date),
                payment_id: None,
                payer_id: None,
            });
            state.carts.remove(&order.user_id);
            let approval_url = (order.payment_method == PaymentMethod::Stripe && !state.omit_approval_url)
                .then(|| format!("https://pay.test/approve/{}", id));
            CheckoutReceipt { order_id: id, approval_url }
        };
        self.gate("create_order").await;
        Ok(receipt)
    }

    async fn capture_payment(&self, capture: &PaymentCapture) -> ClientResult<Order> {
        self.enter("capture_payment")?;
        self.with_order(&capture.order_id, |o| {
            o.payment_status = PaymentStatus::Paid;
            o.order_status = OrderStatus::Confirmed;
            o.payment_id = Some(capture.payment_id.clone());
            o.payer_id = Some(capture.payer_id.clone());
            o.clone()
        })
    }

    async fn list_orders(&self, user_id: &str) -> ClientResult<Vec<Order>> {
        self.enter("list_orders")?;
        Ok(self.state().orders.iter().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.enter("get_order")?;
        let order = self.with_order(order_id, |o| o.clone())?;
        self.gate("get_order").await;
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &str) -> ClientResult<()> {
        self.enter("cancel_order")?;
        self.with_order(order_id, |o| o.order_status = OrderStatus::Cancelled)
    }

    async fn return_order(&self, order_id: &str) -> ClientResult<()> {
        self.enter("return_order")?;
        self.with_order(order_id, |o| o.order_status = OrderStatus::Returned)
    }

    async fn add_review(&self, review: &ReviewDraft) -> ClientResult<Review> {
        self.enter("add_review")?;
        let saved = Review {
            id: self.next_id("R"),
            product_id: review.product_id.clone(),
            user_id: review.user_id.clone(),
            user_name: review.user_name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Some(Utc::now()),
        };
        self.state().reviews.push(saved.clone());
        Ok(saved)
    }

    async fn list_reviews(&self, product_id: &str) -> ClientResult<Vec<Review>> {
        self.enter("list_reviews")?;
        Ok(self.state().reviews.iter().filter(|r| r.product_id == product_id).cloned().collect())
    }

    async fn submit_application(&self, draft: &ApplicationDraft) -> ClientResult<DistributorApplication> {
        self.enter("submit_application")?;
        let app = DistributorApplication {
            id: self.next_id("D"),
            user_id: draft.user_id.clone(),
            company_name: draft.company_name.clone(),
            contact_name: draft.contact_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            message: draft.message.clone(),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        self.state().applications.push(app.clone());
        Ok(app)
    }

    async fn application_for_user(&self, user_id: &str) -> ClientResult<Option<DistributorApplication>> {
        self.enter("application_for_user")?;
        let found = self.state().applications.iter().rev().find(|a| a.user_id == user_id).cloned();
        self.gate("application_for_user").await;
        Ok(found)
    }

    async fn withdraw_application(&self, application_id: &str) -> ClientResult<DistributorApplication> {
        self.enter("withdraw_application")?;
        self.with_application(application_id, |a| a.status = ApplicationStatus::Withdrawn)
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn list_all_orders(&self) -> ClientResult<Vec<Order>> {
        self.enter("list_all_orders")?;
        Ok(self.state().orders.clone())
    }

    async fn get_order_details(&self, order_id: &str) -> ClientResult<Order> {
        self.enter("get_order_details")?;
        self.with_order(order_id, |o| o.clone())
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()> {
        self.enter("update_order_status")?;
        self.with_order(order_id, |o| o.order_status = status)
    }

    async fn mark_order_paid(&self, order_id: &str) -> ClientResult<()> {
        self.enter("mark_order_paid")?;
        self.with_order(order_id, |o| o.payment_status = PaymentStatus::Paid)
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        self.enter("create_product")?;
        let created = Product {
            id: self.next_id("P"),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            brand: draft.brand.clone(),
            price: draft.price,
            sale_price: draft.sale_price,
            total_stock: draft.total_stock,
            image: draft.images.first().cloned(),
            images: draft.images.clone(),
            average_review: None,
        };
        self.state().products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, product_id: &str, draft: &ProductDraft) -> ClientResult<Product> {
        self.enter("update_product")?;
        let mut state = self.state();
        let p = state.products.iter_mut().find(|p| p.id == product_id).ok_or_else(|| ClientError::NotFound("Product not found".into()))?;
        p.title = draft.title.clone();
        p.price = draft.price;
        p.sale_price = draft.sale_price;
        p.total_stock = draft.total_stock;
        Ok(p.clone())
    }

    async fn delete_product(&self, product_id: &str) -> ClientResult<()> {
        self.enter("delete_product")?;
        self.state().products.retain(|p| p.id != product_id);
        Ok(())
    }

    async fn create_brand(&self, draft: &TaxonomyDraft) -> ClientResult<Brand> {
        self.enter("create_brand")?;
        let brand = Brand { id: self.next_id("B"), name: draft.name.clone(), icon: draft.icon, logo: draft.logo.clone() };
        self.state().brands.push(brand.clone());
        Ok(brand)
    }

    async fn delete_brand(&self, brand_id: &str) -> ClientResult<()> {
        self.enter("delete_brand")?;
        self.state().brands.retain(|b| b.id != brand_id);
        Ok(())
    }

    async fn create_category(&self, draft: &TaxonomyDraft) -> ClientResult<Category> {
        self.enter("create_category")?;
        let category = Category { id: self.next_id("C"), name: draft.name.clone(), icon: draft.icon, logo: draft.logo.clone() };
        self.state().categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, category_id: &str) -> ClientResult<()> {
        self.enter("delete_category")?;
        self.state().categories.retain(|c| c.id != category_id);
        Ok(())
    }

    async fn list_applications(&self) -> ClientResult<Vec<DistributorApplication>> {
        self.enter("list_applications")?;
        Ok(self.state().applications.clone())
    }

    async fn set_application_status(&self, application_id: &str, status: ApplicationStatus) -> ClientResult<DistributorApplication> {
        self.enter("set_application_status")?;
        self.with_application(application_id, |a| a.status = status)
    }

    async fn dashboard_metrics(&self) -> ClientResult<DashboardMetrics> {
        self.enter("dashboard_metrics")?;
        Ok(self.state().metrics.clone())
    }
}
