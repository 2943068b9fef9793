//! In-memory team repository implementation

use async_trait::async_trait;

use crate::domain::company::CompanyId;
use crate::domain::team::{MembershipTransaction, NewTeam, Team, TeamId, TeamRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::InMemoryDatabase;

/// In-memory implementation of TeamRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryTeamRepository {
    db: InMemoryDatabase,
}

impl InMemoryTeamRepository {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.db.lock().await.teams.get(&id.value()).cloned())
    }

    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut state = self.db.lock().await;

        if !state.companies.contains_key(&team.company_id.value()) {
            return Err(DomainError::not_found(format!(
                "Company '{}' not found",
                team.company_id
            )));
        }

        let id = state.next_team_id()?;
        let team = Team::from_new(id, team);
        state.teams.insert(id.value(), team.clone());

        Ok(team)
    }

    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Team>, DomainError> {
        let state = self.db.lock().await;

        Ok(state
            .teams
            .values()
            .filter(|t| t.company_id() == company)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: TeamId) -> Result<bool, DomainError> {
        Ok(self.db.lock().await.remove_team(id))
    }

    async fn member_ids(&self, id: TeamId) -> Result<Vec<UserId>, DomainError> {
        let state = self.db.lock().await;

        state
            .members
            .range((id.value(), i64::MIN)..=(id.value(), i64::MAX))
            .map(|(_, user_id)| {
                UserId::new(*user_id).map_err(|e| DomainError::internal(e.to_string()))
            })
            .collect()
    }

    async fn begin(&self) -> Result<Box<dyn MembershipTransaction>, DomainError> {
        Ok(Box::new(self.db.begin().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::{CompanyRepository, NewCompany};
    use crate::domain::user::{NewUser, UserRepository, UserRole};
    use crate::infrastructure::company::InMemoryCompanyRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    async fn setup() -> (InMemoryTeamRepository, InMemoryUserRepository, CompanyId, UserId) {
        let db = InMemoryDatabase::new();
        let users = InMemoryUserRepository::new(db.clone());
        let owner = users
            .create(NewUser {
                email: "owner@x.com".to_string(),
                name: "Owner".to_string(),
                role: UserRole::Manager,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let company = InMemoryCompanyRepository::new(db.clone())
            .create(NewCompany {
                name: "Acme".to_string(),
                description: String::new(),
                created_by: owner.id(),
            })
            .await
            .unwrap();

        (InMemoryTeamRepository::new(db), users, company.id, owner.id())
    }

    fn new_team(company_id: CompanyId, created_by: UserId, name: &str) -> NewTeam {
        NewTeam {
            name: name.to_string(),
            description: String::new(),
            company_id,
            created_by,
        }
    }

    #[tokio::test]
    async fn test_create_requires_company() {
        let (repo, _, _, owner) = setup().await;

        let result = repo
            .create(new_team(CompanyId::new(42).unwrap(), owner, "Ghost"))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_by_company() {
        let (repo, _, company, owner) = setup().await;

        repo.create(new_team(company, owner, "One")).await.unwrap();
        repo.create(new_team(company, owner, "Two")).await.unwrap();

        let teams = repo.list_by_company(company).await.unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].name(), "One");
    }

    #[tokio::test]
    async fn test_member_ids_and_delete() {
        let (repo, users, company, owner) = setup().await;
        let team = repo.create(new_team(company, owner, "Core")).await.unwrap();
        let other = repo.create(new_team(company, owner, "Other")).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        tx.link_user(team.id(), owner).await.unwrap();
        tx.link_user(other.id(), owner).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(repo.member_ids(team.id()).await.unwrap(), vec![owner]);

        assert!(repo.delete(team.id()).await.unwrap());
        assert!(repo.member_ids(team.id()).await.unwrap().is_empty());
        assert_eq!(repo.member_ids(other.id()).await.unwrap(), vec![owner]);
        assert!(users.get(owner).await.unwrap().is_some());
    }
}
