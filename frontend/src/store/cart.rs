//! 购物车状态 (纯逻辑)
//!
//! 服务器是购物车的唯一数据源：每次增删之后都会重新拉取完整购物车，
//! 本地存储只作为按用户区分的缓存。

use bookclub_shared::{CartItem, ProductId, STORAGE_CART_GUEST, STORAGE_CART_PREFIX, UserId};

use super::session::Session;
use crate::api::ApiClient;
use crate::api::transport::Transport;
use crate::error::{ApiError, ApiResult};
use crate::web::KeyValueStore;

/// 购物车缓存的归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOwner {
    User(UserId),
    Guest,
}

impl CartOwner {
    /// `cartItems_{userId}` 或 `cartItems_guest`
    pub fn storage_key(&self) -> String {
        match self {
            CartOwner::User(id) => format!("{}{}", STORAGE_CART_PREFIX, id),
            CartOwner::Guest => format!("{}{}", STORAGE_CART_PREFIX, STORAGE_CART_GUEST),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

impl CartState {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn restore(storage: &impl KeyValueStore, owner: CartOwner) -> Self {
        Self::new(
            storage
                .get_json::<Vec<CartItem>>(&owner.storage_key())
                .unwrap_or_default(),
        )
    }

    pub fn persist(&self, storage: &impl KeyValueStore, owner: CartOwner) {
        if !storage.set_json(&owner.storage_key(), &self.items) {
            log_warn!("[cart] failed to cache items for {:?}", owner);
        }
    }
}

/// 重新加载的序号
///
/// 每次操作领取一个递增序号。成功的结果只要比已经采用的结果更新就会被采用，
/// 因此较新的操作失败时，较早那次成功的重新加载仍然生效；
/// 晚到的旧结果不会覆盖已采用的新结果。
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequencer {
    issued: u64,
    applied: u64,
}

impl Sequencer {
    pub fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// 决定是否采用某个序号的成功结果，采用时推进水位
    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket > self.applied {
            self.applied = ticket;
            true
        } else {
            false
        }
    }

    /// 归属切换：已发出的序号全部作废
    pub fn fence(&mut self) {
        self.applied = self.issued;
    }

    /// 把一次操作的结果交给序号器，返回需要写入的购物车
    ///
    /// 失败直接向上传递，过期的成功结果返回 `None`。
    pub fn settle(
        &mut self,
        ticket: u64,
        result: ApiResult<CartState>,
    ) -> ApiResult<Option<CartState>> {
        let fresh = result?;
        Ok(self.accept(ticket).then_some(fresh))
    }
}

fn require_user(session: &Session, op: &'static str) -> ApiResult<UserId> {
    match (session.is_authorized, session.user_id) {
        (true, Some(id)) => Ok(id),
        _ => Err(ApiError::unauthenticated("cart requires a signed-in user").in_op(op)),
    }
}

/// 购物车操作：调用后端变更接口后总是重新拉取完整购物车
pub struct CartService<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> CartService<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    pub async fn reload(&self, session: &Session) -> ApiResult<CartState> {
        let user_id = require_user(session, "cart.reload")?;
        self.fetch(user_id).await
    }

    pub async fn add_item(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<CartState> {
        let user_id = require_user(session, "cart.add")?;
        self.api
            .add_to_cart(user_id, product_id, quantity.max(1))
            .await
            .map_err(|e| e.in_op_with("cart.add", product_id.to_string()))?;
        self.fetch(user_id).await
    }

    pub async fn remove_item(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> ApiResult<CartState> {
        let user_id = require_user(session, "cart.remove")?;
        self.api
            .remove_from_cart(user_id, product_id)
            .await
            .map_err(|e| e.in_op_with("cart.remove", product_id.to_string()))?;
        self.fetch(user_id).await
    }

    /// 后端只有增删接口：先删除该行再按新数量加入，数量为 0 时仅删除
    pub async fn set_quantity(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<CartState> {
        let user_id = require_user(session, "cart.set_quantity")?;
        let op = |e: ApiError| e.in_op_with("cart.set_quantity", product_id.to_string());

        self.api
            .remove_from_cart(user_id, product_id)
            .await
            .map_err(op)?;
        if quantity > 0 {
            self.api
                .add_to_cart(user_id, product_id, quantity)
                .await
                .map_err(op)?;
        }
        self.fetch(user_id).await
    }

    /// 下单完成后清空
    pub async fn clear(&self, session: &Session) -> ApiResult<CartState> {
        let user_id = require_user(session, "cart.clear")?;
        self.api
            .clear_cart(user_id)
            .await
            .map_err(|e| e.in_op("cart.clear"))?;
        self.fetch(user_id).await
    }

    async fn fetch(&self, user_id: UserId) -> ApiResult<CartState> {
        let cart = self
            .api
            .fetch_cart(user_id)
            .await
            .map_err(|e| e.in_op("cart.reload"))?;
        Ok(CartState::new(cart.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::MockTransport;
    use crate::web::MemoryStorage;
    use bookclub_shared::Role;
    use bookclub_shared::protocol::HttpMethod;
    use serde_json::json;

    fn signed_in(id: UserId) -> Session {
        Session {
            is_authorized: true,
            role: Some(Role::User),
            user_id: Some(id),
        }
    }

    fn item(product_id: ProductId, price: f64, quantity: u32) -> CartItem {
        CartItem {
            product_id,
            title: format!("Товар {}", product_id),
            image_url: None,
            price,
            quantity,
        }
    }

    #[test]
    fn totals_are_derived_from_items() {
        let cart = CartState::new(vec![item(1, 500.0, 2)]);
        assert_eq!(cart.total_price(), 1000.0);
        assert_eq!(cart.item_count(), 2);

        let cart = CartState::new(vec![item(1, 500.0, 2), item(2, 120.5, 3)]);
        assert_eq!(cart.total_price(), 1361.5);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.quantity_of(2), 3);
        assert_eq!(cart.quantity_of(99), 0);
    }

    #[test]
    fn storage_keys_follow_owner() {
        assert_eq!(CartOwner::User(17).storage_key(), "cartItems_17");
        assert_eq!(CartOwner::Guest.storage_key(), "cartItems_guest");
    }

    #[test]
    fn cache_is_kept_per_owner() {
        let storage = MemoryStorage::new();
        CartState::new(vec![item(3, 10.0, 1)]).persist(&storage, CartOwner::User(1));

        assert_eq!(CartState::restore(&storage, CartOwner::User(1)).item_count(), 1);
        assert!(CartState::restore(&storage, CartOwner::User(2)).is_empty());
        assert!(CartState::restore(&storage, CartOwner::Guest).is_empty());
        assert!(storage.contains("cartItems_1"));
    }

    #[test]
    fn sequencer_keeps_newest_applied_result() {
        let mut seq = Sequencer::default();
        let first = seq.next();
        let second = seq.next();
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert!(!seq.accept(second));

        let third = seq.next();
        seq.fence();
        assert!(!seq.accept(third));
        let fourth = seq.next();
        assert!(seq.accept(fourth));
    }

    #[tokio::test]
    async fn add_item_reflects_server_cart() {
        let api = ApiClient::new(MockTransport::new());
        api.transport().mock(
            HttpMethod::Post,
            "/carts/7/products/3?quantity=1",
            200,
            serde_json::Value::Null,
        );
        // 服务器上已有另一件商品
        api.transport().mock(
            HttpMethod::Get,
            "/carts/7",
            200,
            json!({"items": [
                {"productId": 1, "title": "Кружка", "price": 350.0, "quantity": 1},
                {"productId": 3, "title": "Закладка", "price": 90.0, "quantity": 1}
            ]}),
        );

        let state = CartService::new(&api)
            .add_item(&signed_in(7), 3, 1)
            .await
            .unwrap();

        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total_price(), 440.0);
        assert_eq!(
            api.transport().calls(),
            vec![
                (HttpMethod::Post, "/carts/7/products/3?quantity=1".to_string()),
                (HttpMethod::Get, "/carts/7".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn remove_item_reloads_even_when_server_ignores_it() {
        let api = ApiClient::new(MockTransport::new());
        api.transport()
            .mock(HttpMethod::Delete, "/carts/7/products/1", 204, serde_json::Value::Null);
        api.transport().mock(
            HttpMethod::Get,
            "/carts/7",
            200,
            json!({"items": [{"productId": 1, "title": "Кружка", "price": 350.0, "quantity": 1}]}),
        );

        let state = CartService::new(&api)
            .remove_item(&signed_in(7), 1)
            .await
            .unwrap();
        assert_eq!(state.quantity_of(1), 1);
    }

    #[tokio::test]
    async fn mutations_require_authorization() {
        let api = ApiClient::new(MockTransport::new());
        let service = CartService::new(&api);

        let err = service.add_item(&Session::default(), 1, 1).await.unwrap_err();
        assert!(err.is_unauthenticated());
        let err = service.remove_item(&Session::default(), 1).await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(api.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_propagates_error() {
        let api = ApiClient::new(MockTransport::new());
        api.transport().mock(
            HttpMethod::Post,
            "/carts/7/products/3?quantity=1",
            400,
            json!({"message": "Нет в наличии"}),
        );

        let err = CartService::new(&api)
            .add_item(&signed_in(7), 3, 1)
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Ошибка"), "Нет в наличии");
    }

    #[tokio::test]
    async fn set_quantity_replaces_line() {
        let api = ApiClient::new(MockTransport::new());
        api.transport()
            .mock(HttpMethod::Delete, "/carts/2/products/5", 204, serde_json::Value::Null);
        api.transport().mock(
            HttpMethod::Post,
            "/carts/2/products/5?quantity=4",
            200,
            serde_json::Value::Null,
        );
        api.transport().mock(
            HttpMethod::Get,
            "/carts/2",
            200,
            json!({"items": [{"productId": 5, "title": "Блокнот", "price": 200.0, "quantity": 4}]}),
        );

        let state = CartService::new(&api)
            .set_quantity(&signed_in(2), 5, 4)
            .await
            .unwrap();
        assert_eq!(state.item_count(), 4);
        assert_eq!(api.transport().calls().len(), 3);
    }

    #[tokio::test]
    async fn clear_empties_cart() {
        let api = ApiClient::new(MockTransport::new());
        api.transport()
            .mock(HttpMethod::Delete, "/carts/2", 204, serde_json::Value::Null);
        api.transport()
            .mock(HttpMethod::Get, "/carts/2", 200, json!({"items": []}));

        let state = CartService::new(&api).clear(&signed_in(2)).await.unwrap();
        assert!(state.is_empty());
    }

    fn cart_with(product_id: ProductId) -> serde_json::Value {
        json!({"items": [{"productId": product_id, "title": "Книга", "price": 300.0, "quantity": 1}]})
    }

    #[tokio::test]
    async fn older_success_applies_when_newer_add_fails() {
        let api = ApiClient::new(MockTransport::new());
        api.transport().mock(
            HttpMethod::Post,
            "/carts/7/products/2?quantity=1",
            400,
            json!({"message": "Нет в наличии"}),
        );
        api.transport().mock(
            HttpMethod::Post,
            "/carts/7/products/1?quantity=1",
            200,
            serde_json::Value::Null,
        );
        api.transport()
            .mock(HttpMethod::Get, "/carts/7", 200, cart_with(1));

        let service = CartService::new(&api);
        let session = signed_in(7);
        let mut seq = Sequencer::default();
        let first = seq.next();
        let second = seq.next();

        // 后发起的请求先返回且失败
        let newer = service.add_item(&session, 2, 1).await;
        assert!(seq.settle(second, newer).is_err());

        let older = service.add_item(&session, 1, 1).await;
        let applied = seq.settle(first, older).unwrap();
        assert_eq!(applied.map(|c| c.quantity_of(1)), Some(1));
    }

    #[tokio::test]
    async fn late_reload_does_not_overwrite_newer_cart() {
        let api = ApiClient::new(MockTransport::new());
        api.transport()
            .mock(HttpMethod::Get, "/carts/7", 200, cart_with(2));
        api.transport()
            .mock(HttpMethod::Get, "/carts/7", 200, cart_with(1));

        let service = CartService::new(&api);
        let session = signed_in(7);
        let mut seq = Sequencer::default();
        let first = seq.next();
        let second = seq.next();

        let newer = service.reload(&session).await;
        let applied = seq.settle(second, newer).unwrap();
        assert_eq!(applied.map(|c| c.quantity_of(2)), Some(1));

        let older = service.reload(&session).await;
        assert_eq!(seq.settle(first, older).unwrap(), None);
    }

    #[tokio::test]
    async fn result_after_owner_switch_is_discarded() {
        let api = ApiClient::new(MockTransport::new());
        api.transport()
            .mock(HttpMethod::Get, "/carts/7", 200, cart_with(1));

        let mut seq = Sequencer::default();
        let ticket = seq.next();
        seq.fence();

        let late = CartService::new(&api).reload(&signed_in(7)).await;
        assert_eq!(seq.settle(ticket, late).unwrap(), None);
    }
}
