//! 购物车 Context
//!
//! 把 `store::CartService` 包装为响应式状态。每次操作领取一个序号，
//! 由 `Sequencer` 决定结果是否写入信号与本地缓存。

use bookclub_shared::ProductId;
use leptos::prelude::*;

use crate::api;
use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::store::{CartOwner, CartService, CartState, Sequencer};
use crate::web::LocalStorage;

enum CartOp {
    Reload,
    Add(ProductId, u32),
    Remove(ProductId),
    SetQuantity(ProductId, u32),
    Clear,
}

#[derive(Clone, Copy)]
pub struct CartContext {
    pub state: RwSignal<CartState>,
    /// 正在进行的操作数
    pending: RwSignal<u32>,
    seq: StoredValue<Sequencer>,
    auth: AuthContext,
}

impl CartContext {
    pub fn new(auth: AuthContext) -> Self {
        let owner = auth.session_untracked().cart_owner();
        Self {
            state: RwSignal::new(CartState::restore(&LocalStorage, owner)),
            pending: RwSignal::new(0),
            seq: StoredValue::new(Sequencer::default()),
            auth,
        }
    }

    pub fn total_price(&self) -> Signal<f64> {
        let state = self.state;
        Signal::derive(move || state.with(CartState::total_price))
    }

    pub fn item_count(&self) -> Signal<u32> {
        let state = self.state;
        Signal::derive(move || state.with(CartState::item_count))
    }

    pub fn is_busy(&self) -> Signal<bool> {
        let pending = self.pending;
        Signal::derive(move || pending.get() > 0)
    }

    pub async fn reload(&self) -> ApiResult<()> {
        self.run(CartOp::Reload).await
    }

    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> ApiResult<()> {
        self.run(CartOp::Add(product_id, quantity)).await
    }

    pub async fn remove_item(&self, product_id: ProductId) -> ApiResult<()> {
        self.run(CartOp::Remove(product_id)).await
    }

    pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) -> ApiResult<()> {
        self.run(CartOp::SetQuantity(product_id, quantity)).await
    }

    pub async fn clear(&self) -> ApiResult<()> {
        self.run(CartOp::Clear).await
    }

    /// 切换归属 (登出) 时丢弃内存中的购物车，并作废尚未返回的加载
    pub fn reset(&self, owner: CartOwner) {
        self.seq.update_value(Sequencer::fence);
        self.state.set(CartState::restore(&LocalStorage, owner));
    }

    fn issue(&self) -> u64 {
        let mut ticket = 0;
        self.seq.update_value(|seq| ticket = seq.next());
        ticket
    }

    async fn run(&self, op: CartOp) -> ApiResult<()> {
        let session = self.auth.session_untracked();
        let ticket = self.issue();
        let client = api::client();
        let service = CartService::new(&client);

        self.pending.update(|n| *n += 1);
        let result = match op {
            CartOp::Reload => service.reload(&session).await,
            CartOp::Add(product_id, quantity) => {
                service.add_item(&session, product_id, quantity).await
            }
            CartOp::Remove(product_id) => service.remove_item(&session, product_id).await,
            CartOp::SetQuantity(product_id, quantity) => {
                service.set_quantity(&session, product_id, quantity).await
            }
            CartOp::Clear => service.clear(&session).await,
        };
        self.pending.update(|n| *n = n.saturating_sub(1));

        let mut settled = Ok(None);
        self.seq
            .update_value(|seq| settled = seq.settle(ticket, result));
        match settled? {
            Some(fresh) => {
                fresh.persist(&LocalStorage, session.cart_owner());
                self.state.set(fresh);
            }
            None => log_info!("[cart] dropped stale reload #{}", ticket),
        }
        Ok(())
    }
}

/// 从 Context 获取购物车
pub fn use_cart() -> CartContext {
    use_context::<CartContext>().expect("CartContext should be provided")
}
