//! 与 Leptos 无关的客户端状态：会话与购物车
//!
//! 这里的类型只依赖 `KeyValueStore` 与 `Transport` 两个抽象，
//! 可以在原生目标上直接测试；`auth` 与 `cart` 模块把它们包装为响应式 Context。

pub mod cart;
pub mod session;

pub use cart::{CartOwner, CartService, CartState, Sequencer};
pub use session::Session;
