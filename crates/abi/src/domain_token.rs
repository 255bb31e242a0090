use alloy::sol;

sol! {
    /// Minimal ERC-721 surface of the domain ownership token.
    #[sol(rpc)]
    interface IDomainToken {
        function ownerOf(uint256 tokenId) external view returns (address);
        function getApproved(uint256 tokenId) external view returns (address);
        function approve(address to, uint256 tokenId) external;
    }
}
