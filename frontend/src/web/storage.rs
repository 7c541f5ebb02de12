//! LocalStorage 封装模块
//!
//! `KeyValueStore` 抽象了字符串键值存储，浏览器中为 LocalStorage，
//! 测试中使用内存实现。JSON 值 (购物车缓存) 通过 `gloo-storage` 读写。

use gloo_storage::Storage;
use serde::{Serialize, de::DeserializeOwned};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

/// 字符串键值存储
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或出错时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;

    /// 读取并解析 JSON 值；解析失败视为不存在
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(_) => false,
        }
    }
}

/// 浏览器 LocalStorage
///
/// 值以原始字符串保存 (`userRole` = `ADMIN`)，不做 JSON 包装。
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        Self::storage()?;
        gloo_storage::LocalStorage::get(key).ok()
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        Self::storage().is_some() && gloo_storage::LocalStorage::set(key, value).is_ok()
    }
}

/// 内存存储 (测试用)
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}
