//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    // Marketing
    AddMemberRequest,
    // Signatures
    AddStepRequest,
    ContactResponse,
    ContactSearchHit,
    CreateContactRequest,
    // Sales
    CreateDealRequest,
    // GED
    CreateDocumentRequest,
    // HR
    CreateEmployeeRequest,
    CreateFolderRequest,
    CreateLeaveRequest,
    CreateLinkRequest,
    CreateSegmentRequest,
    CreateSignatureRequest,
    DealResponse,
    DeclineRequest,
    DocumentContentRequest,
    DocumentLinkResponse,
    DocumentResponse,
    DocumentSearchHit,
    EmployeeResponse,
    // Queries
    FilterRequest,
    FolderResponse,
    LeaveDecisionRequest,
    LeaveRequestResponse,
    MoveFolderRequest,
    MoveStageRequest,
    NotificationResponse,
    SearchRequest,
    SegmentResponse,
    SignatureStepResponse,
    SignatureWorkflowResponse,
    StageSummaryResponse,
    StatusResponse,
    UpdateContactRequest,
    UpdateDealRequest,
    UpdateDocumentRequest,
    UpdateEmployeeRequest,
    UpdateFolderRequest,
    UpdateLeaveRequest,
    UpdateLinkRequest,
    UpdateSegmentRequest,
    UpdateSignatureRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Folder endpoints
        super::folders::list_folders,
        super::folders::list_root_folders,
        super::folders::create_folder,
        super::folders::get_folder,
        super::folders::update_folder,
        super::folders::move_folder,
        super::folders::delete_folder,
        super::folders::list_children,
        super::folders::list_descendants,
        super::folders::list_folder_documents,
        // Document endpoints
        super::documents::list_documents,
        super::documents::query_documents,
        super::documents::search_documents,
        super::documents::create_document,
        super::documents::get_document,
        super::documents::update_document,
        super::documents::delete_document,
        super::documents::list_document_links,
        super::documents::create_link,
        super::documents::update_link,
        super::documents::delete_link,
        super::documents::list_target_links,
        super::documents::list_target_documents,
        // Signature endpoints
        super::signatures::list_signatures,
        super::signatures::create_signature,
        super::signatures::get_signature,
        super::signatures::update_signature,
        super::signatures::add_step,
        super::signatures::remove_step,
        super::signatures::start_signature,
        super::signatures::sign_step,
        super::signatures::decline_step,
        super::signatures::expire_signatures,
        super::signatures::list_notifications,
        super::signatures::mark_notification_read,
        // HR endpoints
        super::hr::list_employees,
        super::hr::query_employees,
        super::hr::create_employee,
        super::hr::get_employee,
        super::hr::update_employee,
        super::hr::delete_employee,
        super::hr::list_employee_leave,
        super::hr::list_leave,
        super::hr::request_leave,
        super::hr::get_leave,
        super::hr::update_leave,
        super::hr::approve_leave,
        super::hr::reject_leave,
        super::hr::cancel_leave,
        // Marketing endpoints
        super::marketing::list_contacts,
        super::marketing::query_contacts,
        super::marketing::search_contacts,
        super::marketing::create_contact,
        super::marketing::get_contact,
        super::marketing::update_contact,
        super::marketing::delete_contact,
        super::marketing::list_contact_segments,
        super::marketing::list_segments,
        super::marketing::create_segment,
        super::marketing::get_segment,
        super::marketing::update_segment,
        super::marketing::delete_segment,
        super::marketing::list_members,
        super::marketing::add_member,
        super::marketing::remove_member,
        // Sales endpoints
        super::sales::list_deals,
        super::sales::query_deals,
        super::sales::create_deal,
        super::sales::get_deal,
        super::sales::update_deal,
        super::sales::move_stage,
        super::sales::delete_deal,
        super::sales::pipeline_summary,
    ),
    info(
        title = "Bureau API",
        version = "0.1.0",
        description = "Back office API: document management (GED) with e-signature workflows, HR, marketing and the sales pipeline.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "GED", description = "Folders, documents, search and CRM links"),
        (name = "Signatures", description = "Multi-signer workflows and notifications"),
        (name = "HR", description = "Employees and leave requests"),
        (name = "Marketing", description = "Contacts and segments"),
        (name = "Sales", description = "Deals and the pipeline"),
    ),
    components(
        schemas(
            // Queries
            FilterRequest,
            SearchRequest,
            StatusResponse,
            // GED
            FolderResponse,
            CreateFolderRequest,
            UpdateFolderRequest,
            MoveFolderRequest,
            DocumentResponse,
            CreateDocumentRequest,
            UpdateDocumentRequest,
            DocumentContentRequest,
            DocumentSearchHit,
            DocumentLinkResponse,
            CreateLinkRequest,
            UpdateLinkRequest,
            // Signatures
            SignatureWorkflowResponse,
            SignatureStepResponse,
            CreateSignatureRequest,
            UpdateSignatureRequest,
            AddStepRequest,
            DeclineRequest,
            NotificationResponse,
            // HR
            EmployeeResponse,
            CreateEmployeeRequest,
            UpdateEmployeeRequest,
            LeaveRequestResponse,
            CreateLeaveRequest,
            UpdateLeaveRequest,
            LeaveDecisionRequest,
            // Marketing
            ContactResponse,
            CreateContactRequest,
            UpdateContactRequest,
            ContactSearchHit,
            SegmentResponse,
            CreateSegmentRequest,
            UpdateSegmentRequest,
            AddMemberRequest,
            // Sales
            DealResponse,
            CreateDealRequest,
            UpdateDealRequest,
            MoveStageRequest,
            StageSummaryResponse,
        )
    ),
)]
pub struct ApiDoc;
