// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::site::Site;
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::site_repository::SiteRepository;
use crate::infrastructure::database::entities::site as site_entity;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 站点仓库实现
pub struct SiteRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SiteRepositoryImpl {
    /// 创建新的站点仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<site_entity::Model> for Site {
    fn from(m: site_entity::Model) -> Self {
        Self {
            id: m.id,
            account_id: m.account_id,
            user_id: m.user_id,
            host: m.host,
            canonical_url: m.canonical_url,
            created_at: m.created_at.into(),
        }
    }
}

#[async_trait]
impl SiteRepository for SiteRepositoryImpl {
    async fn create(&self, site: &Site) -> Result<Site, RepositoryError> {
        let model = site_entity::ActiveModel {
            id: Set(site.id),
            account_id: Set(site.account_id),
            user_id: Set(site.user_id),
            host: Set(site.host.clone()),
            canonical_url: Set(site.canonical_url.clone()),
            created_at: Set(site.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(site.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepositoryError> {
        let model = site_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Site::from))
    }
}
