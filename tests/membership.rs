//! Membership, role, and metadata operations.

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use agora::store::DocumentGateway;
use agora::ServiceError;

#[tokio::test]
async fn blank_name_defaults_to_creators_discussion() {
    let (gateway, service) = common::service();
    let antoine = common::register(&gateway, "Antoine").await;

    let discussion = service
        .create_discussion("   ", "", antoine.id)
        .await
        .unwrap();

    assert_eq!(discussion.name, "Antoine's discussion");
    assert_eq!(discussion.participants, vec![antoine.id]);
    assert_eq!(discussion.admins, vec![antoine.id]);
    assert!(discussion.messages.is_empty());
}

#[tokio::test]
async fn explicit_names_are_trimmed_and_kept() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;

    let discussion = service
        .create_discussion("  rust talk  ", "weekly", creator.id)
        .await
        .unwrap();

    assert_eq!(discussion.name, "rust talk");
    assert_eq!(discussion.description, "weekly");
}

#[tokio::test]
async fn creation_requires_a_registered_creator() {
    let (_gateway, service) = common::service();

    let result = service.create_discussion("rust", "", Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::AccountNotFound { .. }));
}

#[tokio::test]
async fn creator_starts_with_an_empty_preview_entry() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;

    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();

    let stored = service.gateway().account(creator.id).await.unwrap().doc;
    let preview = stored.preview(discussion.id).expect("preview entry");
    assert_eq!(preview.last_message, "");
    assert_eq!(preview.unread_count, 0);
}

#[tokio::test]
async fn non_admin_participants_cannot_mutate_anything() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let member = common::register(&gateway, "Bob").await;
    let bystander = common::register(&gateway, "Cleo").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    let discussion = service
        .add_participant(discussion.id, creator.id, member.id)
        .await
        .unwrap();

    let denied = [
        service.set_name(discussion.id, member.id, "hijacked").await,
        service
            .set_description(discussion.id, member.id, "hijacked")
            .await,
        service
            .add_participant(discussion.id, member.id, bystander.id)
            .await,
        service
            .remove_participant(discussion.id, member.id, creator.id)
            .await,
        service
            .add_admin(discussion.id, member.id, bystander.id)
            .await,
        service
            .remove_admin(discussion.id, member.id, creator.id)
            .await,
    ];
    for result in denied {
        assert_matches!(result, Err(ServiceError::PermissionDenied { .. }));
    }
    assert_matches!(
        service.delete_discussion(discussion.id, member.id).await,
        Err(ServiceError::PermissionDenied { .. })
    );

    // nothing moved
    let after = service.get_discussion(discussion.id).await.unwrap();
    assert_eq!(after, discussion);
}

#[tokio::test]
async fn participants_may_send_but_outsiders_may_not() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let member = common::register(&gateway, "Bob").await;
    let outsider = common::register(&gateway, "Cleo").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    service
        .add_participant(discussion.id, creator.id, member.id)
        .await
        .unwrap();

    assert!(service
        .send_message(discussion.id, member.id, "hi")
        .await
        .is_ok());
    assert_matches!(
        service.send_message(discussion.id, outsider.id, "hi").await,
        Err(ServiceError::PermissionDenied { .. })
    );
}

#[tokio::test]
async fn adding_a_participant_is_idempotent_and_grants_no_admin_rights() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let member = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();

    service
        .add_participant(discussion.id, creator.id, member.id)
        .await
        .unwrap();
    let after = service
        .add_participant(discussion.id, creator.id, member.id)
        .await
        .unwrap();

    assert_eq!(after.participants, vec![creator.id, member.id]);
    assert_eq!(after.admins, vec![creator.id]);
}

#[tokio::test]
async fn bulk_add_is_all_or_nothing() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let member = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();

    let result = service
        .add_participants(discussion.id, creator.id, &[member.id, Uuid::new_v4()])
        .await;

    assert_matches!(result, Err(ServiceError::AccountNotFound { .. }));
    let after = service.get_discussion(discussion.id).await.unwrap();
    assert_eq!(after.participants, vec![creator.id]);
}

#[tokio::test]
async fn promoting_an_outsider_makes_them_participant_and_admin() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let outsider = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();

    let after = service
        .add_admin(discussion.id, creator.id, outsider.id)
        .await
        .unwrap();

    assert!(after.is_participant(outsider.id));
    assert!(after.is_admin(outsider.id));
    assert!(after.membership_is_consistent());
}

#[tokio::test]
async fn demoting_an_admin_keeps_them_as_participant() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let admin = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    service
        .add_admin(discussion.id, creator.id, admin.id)
        .await
        .unwrap();

    let after = service
        .remove_admin(discussion.id, creator.id, admin.id)
        .await
        .unwrap();

    assert!(after.is_participant(admin.id));
    assert!(!after.is_admin(admin.id));
}

#[tokio::test]
async fn removing_a_participant_revokes_their_admin_role_and_preview() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let admin = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    service
        .add_admin(discussion.id, creator.id, admin.id)
        .await
        .unwrap();
    service
        .send_message(discussion.id, creator.id, "hello")
        .await
        .unwrap();

    let after = service
        .remove_participant(discussion.id, creator.id, admin.id)
        .await
        .unwrap();

    assert!(!after.is_participant(admin.id));
    assert!(!after.is_admin(admin.id));
    let stored = service.gateway().account(admin.id).await.unwrap().doc;
    assert!(stored.preview(discussion.id).is_none());
}

#[tokio::test]
async fn the_creator_can_never_be_removed_or_demoted() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let admin = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    let discussion = service
        .add_admin(discussion.id, creator.id, admin.id)
        .await
        .unwrap();

    // direct, by another admin
    assert_matches!(
        service
            .remove_participant(discussion.id, admin.id, creator.id)
            .await,
        Err(ServiceError::PermissionDenied { .. })
    );
    assert_matches!(
        service.remove_admin(discussion.id, admin.id, creator.id).await,
        Err(ServiceError::PermissionDenied { .. })
    );
    // inside a bulk batch, even by the creator themselves
    assert_matches!(
        service
            .remove_participants(discussion.id, creator.id, &[admin.id, creator.id])
            .await,
        Err(ServiceError::PermissionDenied { .. })
    );
    assert_matches!(
        service
            .remove_admins(discussion.id, creator.id, &[admin.id, creator.id])
            .await,
        Err(ServiceError::PermissionDenied { .. })
    );

    // the rejected batches changed nothing
    let after = service.get_discussion(discussion.id).await.unwrap();
    assert_eq!(after, discussion);
}

#[tokio::test]
async fn blank_rename_falls_back_to_joined_participant_ids() {
    let (gateway, service) = common::service();
    let a1 = common::register(&gateway, "Ada").await;
    let a2 = common::register(&gateway, "Bob").await;
    let a3 = common::register(&gateway, "Cleo").await;
    let discussion = service.create_discussion("rust", "", a1.id).await.unwrap();
    service
        .add_participants(discussion.id, a1.id, &[a2.id, a3.id])
        .await
        .unwrap();

    let renamed = service.set_name(discussion.id, a1.id, "  ").await.unwrap();

    assert_eq!(
        renamed.name,
        format!("Discussion with: {}, {}, {}", a1.id, a2.id, a3.id)
    );
}

#[tokio::test]
async fn late_joiners_see_the_backlog_as_unread() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let joiner = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    service
        .send_message(discussion.id, creator.id, "first")
        .await
        .unwrap();
    service
        .send_message(discussion.id, creator.id, "second")
        .await
        .unwrap();

    service
        .add_participant(discussion.id, creator.id, joiner.id)
        .await
        .unwrap();

    let stored = service.gateway().account(joiner.id).await.unwrap().doc;
    let preview = stored.preview(discussion.id).expect("primed preview");
    assert_eq!(preview.last_message, "second");
    assert_eq!(preview.last_message_sender, Some(creator.id));
    assert_eq!(preview.unread_count, 2);
}

#[tokio::test]
async fn deletion_is_terminal_and_purges_previews() {
    let (gateway, service) = common::service();
    let creator = common::register(&gateway, "Ada").await;
    let member = common::register(&gateway, "Bob").await;
    let discussion = service.create_discussion("rust", "", creator.id).await.unwrap();
    service
        .add_participant(discussion.id, creator.id, member.id)
        .await
        .unwrap();
    service
        .send_message(discussion.id, member.id, "hello")
        .await
        .unwrap();

    service
        .delete_discussion(discussion.id, creator.id)
        .await
        .unwrap();

    assert_matches!(
        service.get_discussion(discussion.id).await,
        Err(ServiceError::DiscussionNotFound { .. })
    );
    for account in [creator.id, member.id] {
        let stored = service.gateway().account(account).await.unwrap().doc;
        assert!(stored.preview(discussion.id).is_none());
    }
}

#[tokio::test]
async fn missing_discussions_fail_before_permission_checks() {
    let (gateway, service) = common::service();
    let rando = common::register(&gateway, "Ada").await;
    let ghost = Uuid::new_v4();

    assert_matches!(
        service.set_name(ghost, rando.id, "x").await,
        Err(ServiceError::DiscussionNotFound { .. })
    );
    assert_matches!(
        service.send_message(ghost, rando.id, "x").await,
        Err(ServiceError::DiscussionNotFound { .. })
    );
    assert_matches!(
        service.delete_discussion(ghost, rando.id).await,
        Err(ServiceError::DiscussionNotFound { .. })
    );
}
